//! Template catalog.
//!
//! A template is a theme (accent colour, font family, layout) plus a stable id
//! the editor stores on each CV. The frontend styles a preview from the CSS
//! class list returned by [`Template::class_names`].

use serde::{Deserialize, Serialize};

pub mod handlers;

/// Font families offered by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Clean humanist sans-serif.
    Inter,
    /// Classic old-style serif.
    EbGaramond,
    Lato,
    /// Traditional TeX font, safest for ATS parsers.
    ComputerModern,
}

impl FontFamily {
    pub fn slug(self) -> &'static str {
        match self {
            FontFamily::Inter => "inter",
            FontFamily::EbGaramond => "eb-garamond",
            FontFamily::Lato => "lato",
            FontFamily::ComputerModern => "computer-modern",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    SingleColumn,
    Sidebar,
}

impl Layout {
    pub fn slug(self) -> &'static str {
        match self {
            Layout::SingleColumn => "single-column",
            Layout::Sidebar => "sidebar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Theme {
    /// Hex colour used for headings and rules.
    pub accent: &'static str,
    pub font: FontFamily,
    pub layout: Layout,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub theme: Theme,
}

impl Template {
    /// CSS classes for the preview root, most general first.
    pub fn class_names(&self) -> String {
        [
            "cv-template".to_string(),
            format!("cv-template--{}", self.id),
            format!("cv-layout--{}", self.theme.layout.slug()),
            format!("cv-font--{}", self.theme.font.slug()),
        ]
        .join(" ")
    }
}

pub const DEFAULT_TEMPLATE_ID: &str = "classic";

const CATALOG: &[Template] = &[
    Template {
        id: "classic",
        name: "Classic",
        description: "Single column, serif type, ATS friendly.",
        theme: Theme {
            accent: "#1f2937",
            font: FontFamily::ComputerModern,
            layout: Layout::SingleColumn,
        },
    },
    Template {
        id: "modern",
        name: "Modern",
        description: "Sans-serif with a coloured sidebar for contact details and skills.",
        theme: Theme {
            accent: "#2563eb",
            font: FontFamily::Inter,
            layout: Layout::Sidebar,
        },
    },
    Template {
        id: "academic",
        name: "Academic",
        description: "Old-style serif suited to education-heavy CVs.",
        theme: Theme {
            accent: "#7c2d12",
            font: FontFamily::EbGaramond,
            layout: Layout::SingleColumn,
        },
    },
    Template {
        id: "compact",
        name: "Compact",
        description: "Dense two-column layout for long careers.",
        theme: Theme {
            accent: "#047857",
            font: FontFamily::Lato,
            layout: Layout::Sidebar,
        },
    },
];

pub fn catalog() -> &'static [Template] {
    CATALOG
}

pub fn find(id: &str) -> Option<&'static Template> {
    CATALOG.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_exists() {
        assert!(find(DEFAULT_TEMPLATE_ID).is_some());
    }

    #[test]
    fn test_unknown_template() {
        assert!(find("neon").is_none());
    }

    #[test]
    fn test_ids_unique() {
        let mut ids: Vec<_> = catalog().iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn test_class_names() {
        let modern = find("modern").unwrap();
        assert_eq!(
            modern.class_names(),
            "cv-template cv-template--modern cv-layout--sidebar cv-font--inter"
        );
    }
}
