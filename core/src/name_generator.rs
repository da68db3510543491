//! Deterministic identity generation using curated French-flavoured lists.
//!
//! Provides person names, postal addresses and bank names for synthetic
//! datasets. All generation is deterministic (same RNG seed = same output).

use crate::rng::StreamRng;

/// Deterministic name generator using curated lists
pub struct NameGenerator;

impl NameGenerator {
    /// Generate a full name (first + last) deterministically
    pub fn generate_full_name(rng: &mut StreamRng) -> String {
        let first_name = Self::generate_first_name(rng);
        let last_name = Self::generate_last_name(rng);
        format!("{} {}", first_name, last_name)
    }

    pub fn generate_first_name(rng: &mut StreamRng) -> &'static str {
        Self::draw(rng, Self::first_names())
    }

    pub fn generate_last_name(rng: &mut StreamRng) -> &'static str {
        Self::draw(rng, Self::last_names())
    }

    /// "12 rue de la Paix, 75002 Paris"
    pub fn generate_address(rng: &mut StreamRng) -> String {
        let number = 1 + rng.next_u64_below(180);
        let street_type = Self::draw(rng, Self::street_types());
        let street = Self::draw(rng, Self::street_names());
        let (city, department) = *rng.pick(Self::cities()).unwrap_or(&("Paris", 75));
        let postcode = department * 1000 + rng.next_u64_below(20) * 10;
        format!("{number} {street_type} {street}, {postcode:05} {city}")
    }

    /// Bank names in list order, cycling with a numeric suffix once the
    /// curated list runs out. Distinct for any `count`.
    pub fn bank_names(count: usize) -> Vec<String> {
        let base = Self::banks();
        (0..count)
            .map(|i| {
                let name = base[i % base.len()];
                match i / base.len() {
                    0 => name.to_string(),
                    round => format!("{name} {}", round + 1),
                }
            })
            .collect()
    }

    fn draw(rng: &mut StreamRng, list: &'static [&'static str]) -> &'static str {
        rng.pick(list).copied().unwrap_or("")
    }

    fn first_names() -> &'static [&'static str] {
        &[
            // Male names
            "Jean", "Pierre", "Michel", "Philippe", "Alain", "Nicolas", "Christophe",
            "Patrick", "Daniel", "Laurent", "Julien", "Thomas", "Antoine", "Hugo",
            "Louis", "Lucas", "Mathieu", "Olivier", "Vincent", "Yves", "Bernard",
            "Guillaume", "Maxime", "Romain", "Arnaud", "Bruno", "Denis", "Didier",
            "Emmanuel", "Fabrice", "Gilles", "Henri", "Jacques", "Marc", "Pascal",
            "Raphael", "Sebastien", "Thierry", "Xavier", "Benoit",

            // Female names
            "Marie", "Nathalie", "Isabelle", "Sylvie", "Catherine", "Christine",
            "Sophie", "Camille", "Julie", "Claire", "Anne", "Emma", "Chloe", "Lea",
            "Manon", "Ines", "Juliette", "Margaux", "Pauline", "Sandrine", "Valerie",
            "Veronique", "Aurelie", "Celine", "Delphine", "Elodie", "Florence",
            "Helene", "Laure", "Martine", "Monique", "Nadine", "Odile", "Patricia",
            "Stephanie", "Virginie", "Agathe", "Brigitte", "Colette", "Jeanne",
        ]
    }

    fn last_names() -> &'static [&'static str] {
        &[
            "Martin", "Bernard", "Thomas", "Petit", "Robert", "Richard", "Durand",
            "Dubois", "Moreau", "Laurent", "Simon", "Michel", "Lefebvre", "Leroy",
            "Roux", "David", "Bertrand", "Morel", "Fournier", "Girard", "Bonnet",
            "Dupont", "Lambert", "Fontaine", "Rousseau", "Vincent", "Muller", "Lefevre",
            "Faure", "Andre", "Mercier", "Blanc", "Guerin", "Boyer", "Garnier",
            "Chevalier", "Francois", "Legrand", "Gauthier", "Garcia", "Perrin",
            "Robin", "Clement", "Morin", "Nicolas", "Henry", "Roussel", "Mathieu",
            "Gautier", "Masson", "Marchand", "Duval", "Denis", "Dumont", "Marie",
            "Lemaire", "Noel", "Meyer", "Dufour", "Meunier", "Brun", "Blanchard",
            "Giraud", "Joly", "Riviere", "Lucas", "Brunet", "Gaillard", "Barbier",
            "Arnaud", "Martinez", "Gerard", "Roche", "Renard", "Schmitt", "Roy",
            "Leroux", "Colin", "Vidal", "Caron", "Picard", "Roger", "Fabre",
        ]
    }

    fn street_types() -> &'static [&'static str] {
        &["rue", "avenue", "boulevard", "place", "impasse", "chemin", "quai", "allee"]
    }

    fn street_names() -> &'static [&'static str] {
        &[
            "de la Paix", "Victor Hugo", "Jean Jaures", "de la Republique",
            "Pasteur", "du General de Gaulle", "des Lilas", "de la Gare",
            "Gambetta", "Voltaire", "du Moulin", "des Ecoles", "de l'Eglise",
            "Nationale", "du Chateau", "Saint-Michel", "des Acacias", "Foch",
            "de Verdun", "Carnot",
        ]
    }

    fn cities() -> &'static [(&'static str, u64)] {
        &[
            ("Paris", 75),
            ("Marseille", 13),
            ("Lyon", 69),
            ("Toulouse", 31),
            ("Nice", 6),
            ("Nantes", 44),
            ("Strasbourg", 67),
            ("Montpellier", 34),
            ("Bordeaux", 33),
            ("Lille", 59),
            ("Rennes", 35),
            ("Reims", 51),
            ("Grenoble", 38),
            ("Dijon", 21),
            ("Angers", 49),
        ]
    }

    fn banks() -> &'static [&'static str] {
        &[
            "Banque du Centre",
            "Credit Atlantique",
            "Societe Financiere de Lyon",
            "Caisse Alpine",
            "Banque Meridionale",
            "Credit du Nord-Est",
            "Banque Populaire Rhodanienne",
            "Caisse d'Epargne Ligerienne",
        ]
    }
}
