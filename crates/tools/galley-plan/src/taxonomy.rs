//! The fixed rendition taxonomy: roles, galley labels and genres.

use std::fmt;

/// Semantic role of a discovered production file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    OnlinePdf,
    Html,
    Figure,
    Css,
    Replication,
    Appendix,
}

impl Role {
    pub const ALL: [Self; 6] = [
        Self::OnlinePdf,
        Self::Html,
        Self::Figure,
        Self::Css,
        Self::Replication,
        Self::Appendix,
    ];

    /// Galley the role is published under.
    pub fn galley(self) -> GalleyLabel {
        match self {
            Self::OnlinePdf => GalleyLabel::Pdf,
            Self::Html | Self::Figure | Self::Css => GalleyLabel::Html,
            Self::Replication => GalleyLabel::ReplicationFiles,
            Self::Appendix => GalleyLabel::OnlineAppendix,
        }
    }

    pub fn genre(self) -> Genre {
        match self {
            Self::OnlinePdf | Self::Html => Genre::ArticleText,
            Self::Figure => Genre::Image,
            Self::Css => Genre::HtmlStylesheet,
            Self::Replication => Genre::ResearchMaterials,
            Self::Appendix => Genre::Appendix,
        }
    }

    /// Figures and stylesheets only make sense attached to the HTML main file.
    pub fn is_dependent(self) -> bool {
        matches!(self, Self::Figure | Self::Css)
    }

    /// At most one file per submission may hold a singleton role.
    pub fn is_singleton(self) -> bool {
        matches!(self, Self::OnlinePdf | Self::Html)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::OnlinePdf => "OnlinePDF file",
            Self::Html => "HTML file",
            Self::Figure => "Figure for HTML",
            Self::Css => "CSS for HTML",
            Self::Replication => "Replication file",
            Self::Appendix => "Appendix file",
        }
    }
}

/// Remote galley a file is published under. Ordered the way galleys are
/// presented and processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GalleyLabel {
    Pdf,
    Html,
    ReplicationFiles,
    OnlineAppendix,
}

impl GalleyLabel {
    pub const ALL: [Self; 4] = [
        Self::Pdf,
        Self::Html,
        Self::ReplicationFiles,
        Self::OnlineAppendix,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Html => "HTML",
            Self::ReplicationFiles => "Replication Files",
            Self::OnlineAppendix => "Online Appendix",
        }
    }

    /// Parses a remote galley label, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for GalleyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OJS genre the file is uploaded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genre {
    ArticleText,
    ResearchMaterials,
    Image,
    HtmlStylesheet,
    Appendix,
}

impl Genre {
    pub fn id(self) -> u32 {
        match self {
            Self::ArticleText => 1,
            Self::ResearchMaterials => 3,
            Self::Image => 10,
            Self::HtmlStylesheet => 11,
            Self::Appendix => 12,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ArticleText => "Article Text",
            Self::ResearchMaterials => "Research Materials",
            Self::Image => "Image",
            Self::HtmlStylesheet => "HTML Stylesheet",
            Self::Appendix => "Appendix",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_table() {
        let table: Vec<_> = Role::ALL
            .iter()
            .map(|r| (r.galley().as_str(), r.genre().id()))
            .collect();
        assert_eq!(
            table,
            vec![
                ("PDF", 1),
                ("HTML", 1),
                ("HTML", 10),
                ("HTML", 11),
                ("Replication Files", 3),
                ("Online Appendix", 12),
            ]
        );
    }

    #[test]
    fn only_figures_and_css_are_dependent() {
        let dependent: Vec<_> = Role::ALL.into_iter().filter(|r| r.is_dependent()).collect();
        assert_eq!(dependent, vec![Role::Figure, Role::Css]);
        assert!(dependent.iter().all(|r| r.galley() == GalleyLabel::Html));
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(GalleyLabel::from_label("pdf"), Some(GalleyLabel::Pdf));
        assert_eq!(
            GalleyLabel::from_label(" replication files "),
            Some(GalleyLabel::ReplicationFiles)
        );
        assert_eq!(
            GalleyLabel::from_label("ONLINE APPENDIX"),
            Some(GalleyLabel::OnlineAppendix)
        );
        assert_eq!(GalleyLabel::from_label("EPUB"), None);
    }

    #[test]
    fn labels_order_pdf_first() {
        let mut labels = vec![
            GalleyLabel::OnlineAppendix,
            GalleyLabel::Html,
            GalleyLabel::Pdf,
        ];
        labels.sort();
        assert_eq!(
            labels,
            vec![GalleyLabel::Pdf, GalleyLabel::Html, GalleyLabel::OnlineAppendix]
        );
    }
}
