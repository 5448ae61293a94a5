//! Views over a resolved project list: highlights, detail lookup, and detail sections.

use crate::error::AppError;
use crate::models::ProjectRecord;

/// Projects flagged for the home-page slider, in list order.
pub fn highlights(projects: &[ProjectRecord]) -> Vec<&ProjectRecord> {
    projects.iter().filter(|p| p.is_highlight()).collect()
}

/// Finds the project a detail page was opened for.
pub fn find_project<'a>(projects: &'a [ProjectRecord], id: &str) -> Result<&'a ProjectRecord, AppError> {
    projects
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::ProjectNotFound(id.to_string()))
}

/// Tabs on the project detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSection {
    Intro,
    Wiring,
    Firmware,
    Accessory,
    Qa,
}

impl ProjectSection {
    /// Tab order.
    pub const ALL: [ProjectSection; 5] = [
        ProjectSection::Intro,
        ProjectSection::Wiring,
        ProjectSection::Firmware,
        ProjectSection::Accessory,
        ProjectSection::Qa,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ProjectSection::Intro => "intro",
            ProjectSection::Wiring => "wiring",
            ProjectSection::Firmware => "firmware",
            ProjectSection::Accessory => "accessory",
            ProjectSection::Qa => "qa",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ProjectSection::Intro => "Introduction",
            ProjectSection::Wiring => "Wiring Diagram",
            ProjectSection::Firmware => "Install firmware",
            ProjectSection::Accessory => "Accessory",
            ProjectSection::Qa => "Q & A",
        }
    }
}

/// HTML body of a section, falling back to the project summary.
pub fn section_body(project: &ProjectRecord, section: ProjectSection) -> String {
    let authored = project.content.as_ref().and_then(|content| match section {
        ProjectSection::Intro => content.intro.as_deref(),
        ProjectSection::Wiring => content.wiring.as_deref(),
        ProjectSection::Firmware => content.firmware.as_deref(),
        ProjectSection::Accessory => content.accessory.as_deref(),
        ProjectSection::Qa => content.qa.as_deref(),
    });

    match authored.filter(|body| !body.is_empty()) {
        Some(body) => body.to_string(),
        None if project.summary.is_empty() => "<p>No content.</p>".to_string(),
        None => format!("<p>{}</p>", project.summary),
    }
}
