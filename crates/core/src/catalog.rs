use serde::Serialize;

/// A training video that can be recommended after an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub title: &'static str,
    pub keywords: &'static [&'static str],
    pub url: &'static str,
}

pub static CATALOG: &[Recommendation] = &[
    Recommendation {
        title: "Principes de base de l'UI Design",
        keywords: &["ui", "interface", "couleurs"],
        url: "https://videos.example.com/ui-design-basics.mp4",
    },
    Recommendation {
        title: "Créer une interface cohérente avec Figma",
        keywords: &["figma", "prototypage"],
        url: "https://videos.example.com/figma-interface.mp4",
    },
    Recommendation {
        title: "Améliorer l'expérience utilisateur : 5 techniques avancées",
        keywords: &["ux", "utilisateur", "experience"],
        url: "https://videos.example.com/ux-advanced.mp4",
    },
];

/// Entries whose keywords or title contain `term`, ignoring case.
pub fn find_by_keyword(term: &str) -> Vec<&'static Recommendation> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return CATALOG.iter().collect();
    }
    CATALOG
        .iter()
        .filter(|r| {
            r.keywords.iter().any(|k| k.contains(term.as_str()))
                || r.title.to_lowercase().contains(term.as_str())
        })
        .collect()
}
