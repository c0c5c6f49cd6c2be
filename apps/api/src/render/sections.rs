//! Per-section LaTeX fragments.
//!
//! Every formatter is pure: entries missing their required fields are skipped,
//! free-text fields are escaped one by one, and an empty result means the
//! section is left out of the document.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::models::resume::{
    Achievement, Award, Certification, ContactLink, Education, Experience, Publication, Skill,
    SkillItems,
};
use crate::render::escape::{escape, escape_preserving};

/// Separator glyph between contact links and around award details.
pub const VERT: &str = " $\\vert$ ";

/// Spacing emitted between publications, never after the last one.
const PUBLICATION_SPACING: &str = "  \\vspace{5pt}\n";

/// Markdown links, or `\href` markup the author already wrote by hand.
fn inline_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[([^\]]+)\]\(([^)]+)\)|\\href\{([^}]*)\}\{([^}]*)\}")
            .expect("valid inline link regex")
    })
}

/// Trimmed value, or `None` when missing or blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn date_range(start: Option<&str>, end: Option<&str>, separator: &str) -> String {
    match (non_blank(start), non_blank(end)) {
        (Some(start), Some(end)) => format!("{}{separator}{}", escape(Some(start)), escape(Some(end))),
        (Some(only), None) | (None, Some(only)) => escape(Some(only)),
        (None, None) => String::new(),
    }
}

/// `\href{url}{name}` for each complete link, joined with a vertical bar.
pub fn format_contact_links(links: &[ContactLink]) -> String {
    links
        .iter()
        .filter_map(|link| {
            let name = non_blank(link.name.as_deref())?;
            let url = non_blank(link.url.as_deref())?;
            Some(format!("\\href{{{url}}}{{{}}}", escape(Some(name))))
        })
        .collect::<Vec<_>>()
        .join(VERT)
}

pub fn format_skills(skills: &[Skill]) -> String {
    let mut out = String::new();
    for skill in skills {
        let Some(category) = non_blank(skill.category.as_deref()) else {
            continue;
        };
        let items = skill.items.as_ref().map(SkillItems::joined).unwrap_or_default();
        if items.trim().is_empty() {
            continue;
        }

        out.push_str(&format!(
            "  \\resumeSubheading\n    {{{}}}{{}}\n    {{{}}}{{}}\n",
            escape(Some(category)),
            escape(Some(&items)),
        ));
    }
    out
}

/// The four mutually exclusive shapes of an experience entry's company line.
#[derive(Debug, PartialEq, Eq)]
enum CompanyLine<'a> {
    LinkedWithDescription { url: &'a str, description: &'a str },
    WithDescription { description: &'a str },
    Linked { url: &'a str },
    Plain,
}

impl<'a> CompanyLine<'a> {
    fn for_entry(exp: &'a Experience) -> Self {
        let url = non_blank(exp.company_url.as_deref());
        let description = non_blank(exp.company_description.as_deref());
        match (url, description) {
            (Some(url), Some(description)) => CompanyLine::LinkedWithDescription { url, description },
            (None, Some(description)) => CompanyLine::WithDescription { description },
            (Some(url), None) => CompanyLine::Linked { url },
            (None, None) => CompanyLine::Plain,
        }
    }

    fn render(&self, company: &str) -> String {
        match *self {
            CompanyLine::LinkedWithDescription { url, description } => format!(
                "\\href{{{url}}}{{{company}}}{{: {}}}",
                escape(Some(description))
            ),
            CompanyLine::WithDescription { description } => {
                format!("{company}{{: {}}}", escape(Some(description)))
            }
            CompanyLine::Linked { url } => format!("\\href{{{url}}}{{{company}}}"),
            CompanyLine::Plain => company.to_string(),
        }
    }
}

/// Converts inline links to `\href` and escapes everything around them.
///
/// The link target stays literal, with a stray `\&` collapsed back to `&`;
/// the visible text is escaped like the rest of the description.
pub fn format_description(description: &str) -> String {
    escape_preserving(description, inline_link_re(), |caps: &Captures<'_>| {
        match (caps.get(1), caps.get(2)) {
            (Some(text), Some(url)) => format!(
                "\\href{{{}}}{{{}}}",
                url.as_str().trim().replace("\\&", "&"),
                escape(Some(text.as_str())),
            ),
            _ => format!(
                "\\href{{{}}}{{{}}}",
                caps.get(3).map_or("", |m| m.as_str()).replace("\\&", "&"),
                caps.get(4).map_or("", |m| m.as_str()),
            ),
        }
    })
}

fn format_achievements(achievements: &[Achievement]) -> String {
    let items: Vec<String> = achievements
        .iter()
        .filter(|a| {
            non_blank(a.name.as_deref()).is_some() || non_blank(a.description.as_deref()).is_some()
        })
        .map(|a| {
            format!(
                "      \\resumeItem{{{}}}\n      {{{}}}\n",
                escape(a.name.as_deref()),
                format_description(a.description.as_deref().unwrap_or_default()),
            )
        })
        .collect();

    if items.is_empty() {
        return String::new();
    }
    format!(
        "    \\resumeItemListStart\n{}      \\resumeItemListEnd\n\n",
        items.concat()
    )
}

pub fn format_experience(experience: &[Experience]) -> String {
    let mut out = String::new();
    for exp in experience {
        let (Some(title), Some(company)) = (
            non_blank(exp.title.as_deref()),
            non_blank(exp.company.as_deref()),
        ) else {
            continue;
        };

        let company_text = CompanyLine::for_entry(exp).render(&escape(Some(company)));
        out.push_str(&format!(
            "  \\resumeSubheading\n  {{{}}}{{{}}}\n  {{{company_text}}}{{{}}}\n",
            escape(Some(title)),
            date_range(exp.date_start.as_deref(), exp.date_end.as_deref(), " - "),
            escape(exp.location.as_deref()),
        ));

        if let Some(achievements) = &exp.achievements {
            out.push_str(&format_achievements(achievements));
        }
    }
    out
}

pub fn format_education(education: &[Education]) -> String {
    let mut out = String::new();
    for edu in education {
        let (Some(degree), Some(institution)) = (
            non_blank(edu.degree.as_deref()),
            non_blank(edu.institution.as_deref()),
        ) else {
            continue;
        };

        out.push_str(&format!(
            "    \\resumeSubheading\n      {{{}}}{{{}}}\n      {{{}}}{{{}}}\n",
            escape(Some(degree)),
            date_range(edu.date_start.as_deref(), edu.date_end.as_deref(), " -- "),
            escape(Some(institution)),
            escape(edu.location.as_deref()),
        ));
    }
    out
}

/// Organization, optionally followed by its detail. With a detail URL only
/// the part of the detail after its last colon becomes the link text.
fn award_organization(award: &Award, organization: &str) -> String {
    let Some(detail) = non_blank(award.organization_detail.as_deref()) else {
        return organization.to_string();
    };
    let detail = escape(Some(detail));

    match non_blank(award.organization_url.as_deref()) {
        Some(url) => {
            let tail = detail.rsplit(':').next().unwrap_or_default().trim();
            format!("{organization}{VERT}\\href{{{url}}}{{{tail}}}")
        }
        None => format!("{organization}{VERT}{detail}"),
    }
}

pub fn format_awards(awards: &[Award]) -> String {
    let mut out = String::new();
    for award in awards {
        let (Some(title), Some(organization)) = (
            non_blank(award.title.as_deref()),
            non_blank(award.organization.as_deref()),
        ) else {
            continue;
        };

        out.push_str(&format!(
            "    \\resumeSubheading\n      {{{}}}{{{}}}\n      {{{}}}{{{}}}\n",
            escape(Some(title)),
            escape(award.date.as_deref()),
            award_organization(award, &escape(Some(organization))),
            escape(award.location.as_deref()),
        ));
    }
    out
}

pub fn format_certifications(certifications: &[Certification]) -> String {
    let mut out = String::new();
    for cert in certifications {
        let (Some(title), Some(organization)) = (
            non_blank(cert.title.as_deref()),
            non_blank(cert.organization.as_deref()),
        ) else {
            continue;
        };

        let link = non_blank(cert.url.as_deref())
            .map(|url| format!("\\href{{{url}}}{{Certificate}}"))
            .unwrap_or_default();
        out.push_str(&format!(
            "    \\resumeSubheading\n      {{{}}}{{{}}}\n      {{{link}}}{{{}}}\n",
            escape(Some(title)),
            escape(cert.date.as_deref()),
            escape(Some(organization)),
        ));
    }
    out
}

/// Wraps each configured author name found in `authors` in `\textbf`.
///
/// Matching is an exact substring match on the escaped text: "M. Doe" does
/// not match "Doe, M." or "Mary Doe".
fn highlight_authors(authors: String, highlight: &[String]) -> String {
    highlight
        .iter()
        .filter_map(|name| non_blank(Some(name.as_str())))
        .fold(authors, |acc, name| {
            let escaped = escape(Some(name));
            acc.replace(&escaped, &format!("\\textbf{{{escaped}}}"))
        })
}

pub fn format_publications(publications: &[Publication], highlight: &[String]) -> String {
    let items: Vec<String> = publications
        .iter()
        .filter_map(|publication| {
            let authors = non_blank(publication.authors.as_deref())?;
            let title = non_blank(publication.title.as_deref())?;

            let mut parts = vec![
                highlight_authors(escape(Some(authors)), highlight),
                format!("``{}''", escape(Some(title))),
            ];
            if let Some(venue) = non_blank(publication.venue.as_deref()) {
                parts.push(escape(Some(venue)));
            }
            if let Some(year) = &publication.year {
                let year = year.to_string();
                if let Some(year) = non_blank(Some(year.as_str())) {
                    parts.push(escape(Some(year)));
                }
            }
            let link = non_blank(publication.url.as_deref())
                .map(|url| format!(" \\href{{{url}}}{{link}}"))
                .unwrap_or_default();

            Some(format!("  \\item{{{}.{link}}}\n", parts.join(", ")))
        })
        .collect();

    items.join(PUBLICATION_SPACING)
}
