//! Fills the résumé template from a [`ResumeData`] record.

use crate::models::resume::ResumeData;
use crate::render::escape::escape;
use crate::render::sections::{
    format_awards, format_certifications, format_contact_links, format_education,
    format_experience, format_publications, format_skills, non_blank,
};
use crate::render::template::{Slot, SlotValues, Template};

/// Document shell used when the record has no content at all.
pub const FALLBACK_DOCUMENT: &str = include_str!("../../templates/fallback.tex");

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Author names set in bold wherever they appear verbatim in a publication.
    pub highlight_authors: Vec<String>,
}

/// How the contact block is laid out, decided by which side has content.
///
/// Phone and email make up the left side, links and location the right side.
#[derive(Debug, PartialEq, Eq)]
pub enum ContactLayout {
    /// Left parts on the first row, right parts on the second.
    TwoColumn { left: Vec<String>, right: Vec<String> },
    /// One part per row, aligned `l` or `r`.
    SingleColumn { align: char, rows: Vec<String> },
    Omitted,
}

impl ContactLayout {
    pub fn choose(
        phone: Option<&str>,
        email: Option<&str>,
        location: Option<&str>,
        links: &str,
    ) -> Self {
        let left: Vec<String> = [
            phone.map(|p| format!("Phone: {}", escape(Some(p)))),
            email.map(|e| format!("Email: {}", escape(Some(e)))),
        ]
        .into_iter()
        .flatten()
        .collect();

        let right: Vec<String> = [
            (!links.is_empty()).then(|| links.to_string()),
            location.map(|l| format!("Location: {}", escape(Some(l)))),
        ]
        .into_iter()
        .flatten()
        .collect();

        match (left.is_empty(), right.is_empty()) {
            (false, false) => ContactLayout::TwoColumn { left, right },
            (false, true) => ContactLayout::SingleColumn { align: 'l', rows: left },
            (true, false) => ContactLayout::SingleColumn { align: 'r', rows: right },
            (true, true) => ContactLayout::Omitted,
        }
    }

    pub fn render(&self) -> String {
        match self {
            ContactLayout::TwoColumn { left, right } => format!(
                "\\begin{{tabular*}}{{\\textwidth}}{{l@{{\\extracolsep{{\\fill}}}}r}}\n  {} \\\\\n  {}\n\\end{{tabular*}}",
                left.join(" & "),
                right.join(" & "),
            ),
            ContactLayout::SingleColumn { align, rows } => format!(
                "\\begin{{tabular*}}{{\\textwidth}}{{{align}}}\n  {}\n\\end{{tabular*}}",
                rows.join(" \\\\\n  "),
            ),
            ContactLayout::Omitted => String::new(),
        }
    }
}

/// Renders `data` into `template`.
///
/// Sections without content lose their whole anchor block. A record with no
/// content at all yields [`FALLBACK_DOCUMENT`]. Pure and deterministic.
pub fn render_resume(data: &ResumeData, template: &Template, options: &RenderOptions) -> String {
    let links = format_contact_links(&data.contact.links);

    let mut values = SlotValues::default();
    values.set(Slot::Skills, format_skills(&data.skills));
    values.set(Slot::Experience, format_experience(&data.experience));
    values.set(Slot::Education, format_education(&data.education));
    values.set(Slot::Awards, format_awards(&data.awards));
    values.set(Slot::Certifications, format_certifications(&data.certifications));
    values.set(
        Slot::Publications,
        format_publications(&data.publications, &options.highlight_authors),
    );

    let name = non_blank(data.name.as_deref());
    let summary = non_blank(data.summary.as_deref());
    let phone = non_blank(data.contact.phone.as_deref());
    let email = non_blank(data.contact.email.as_deref());
    let location = non_blank(data.contact.location.as_deref());

    let has_content = !values.is_empty()
        || !links.is_empty()
        || [name, summary, phone, email, location].iter().any(Option::is_some);
    if !has_content {
        tracing::debug!("Record has no content, rendering fallback document");
        return FALLBACK_DOCUMENT.to_string();
    }

    if let Some(name) = name {
        values.set(Slot::Name, escape(Some(name)));
    }
    if let Some(summary) = summary {
        values.set(Slot::Summary, escape(Some(summary)));
    }
    values.set(
        Slot::Contact,
        ContactLayout::choose(phone, email, location, &links).render(),
    );

    template.fill(&values)
}
