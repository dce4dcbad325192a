//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde_json::{json, Value};
use storyweb_domain::{
    ClusterId, Identity, Link, LinkType, RefTag, Representative, Resolution, Site,
};
use storyweb_extractor::IngestReport;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format source sites.
    pub fn format_sites(&self, sites: &[Site]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(
                &sites
                    .iter()
                    .map(|s| json!({ "site": s.site, "ref_count": s.ref_count }))
                    .collect::<Vec<_>>(),
            )?),
            OutputFormat::Quiet => Ok(join_lines(sites.iter().map(|s| s.site.clone()))),
            OutputFormat::Table => {
                if sites.is_empty() {
                    return Ok(self.colorize("No sites found.", "yellow"));
                }
                Ok(self.table(
                    &["Site", "Articles"],
                    sites
                        .iter()
                        .map(|s| vec![s.site.clone(), s.ref_count.to_string()]),
                ))
            }
        }
    }

    /// Format aggregated tags.
    pub fn format_tags(&self, tags: &[RefTag]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(
                &tags.iter().map(ref_tag_json).collect::<Vec<_>>(),
            )?),
            OutputFormat::Quiet => Ok(join_lines(
                tags.iter()
                    .filter_map(|t| t.identity.map(|id| id.to_string())),
            )),
            OutputFormat::Table => {
                if tags.is_empty() {
                    return Ok(self.colorize("No tags found.", "yellow"));
                }
                Ok(self.table(
                    &["Identity", "Text", "Category", "Count", "Site", "Title"],
                    tags.iter().map(|t| {
                        vec![
                            t.identity.map(|id| id.to_string()).unwrap_or_default(),
                            t.text.clone(),
                            t.category.to_string(),
                            t.count.to_string(),
                            t.ref_.site.clone(),
                            t.ref_.title.clone(),
                        ]
                    }),
                ))
            }
        }
    }

    /// Format identities.
    pub fn format_identities(&self, identities: &[Identity]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(
                &identities.iter().map(identity_json).collect::<Vec<_>>(),
            )?),
            OutputFormat::Quiet => Ok(join_lines(identities.iter().map(|i| i.id.to_string()))),
            OutputFormat::Table => {
                if identities.is_empty() {
                    return Ok(self.colorize("No identities found.", "yellow"));
                }
                Ok(self.table(
                    &["ID", "Label", "Category", "Key", "Article", "Cluster"],
                    identities.iter().map(|i| {
                        vec![
                            i.id.to_string(),
                            i.label.clone(),
                            i.category.to_string(),
                            i.key.clone(),
                            i.ref_id.clone(),
                            i.cluster.to_string(),
                        ]
                    }),
                ))
            }
        }
    }

    /// Format a cluster: its representative and members.
    pub fn format_cluster(
        &self,
        representative: Option<&Representative>,
        members: &[Identity],
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "representative": representative.map(representative_json),
                "members": members.iter().map(identity_json).collect::<Vec<_>>(),
            }))?),
            OutputFormat::Quiet => self.format_identities(members),
            OutputFormat::Table => {
                let heading = match representative {
                    Some(r) => self.colorize(
                        &format!("{} ({}) - cluster {}", r.label, r.category, r.cluster),
                        "cyan",
                    ),
                    None => self.colorize("Empty cluster.", "yellow"),
                };
                Ok(format!("{}\n{}", heading, self.format_identities(members)?))
            }
        }
    }

    /// Format an identity resolved to its cluster.
    pub fn format_resolution(&self, resolution: &Resolution) -> Result<String> {
        let identity = &resolution.identity;
        let representative = &resolution.representative;
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "identity": identity_json(identity),
                "cluster": representative_json(representative),
            }))?),
            OutputFormat::Quiet => Ok(representative.cluster.to_string()),
            OutputFormat::Table => Ok(self.table(
                &["Field", "Value"],
                [
                    vec!["ID".to_string(), identity.id.to_string()],
                    vec!["Label".to_string(), identity.label.clone()],
                    vec!["Category".to_string(), identity.category.to_string()],
                    vec!["Key".to_string(), identity.key.clone()],
                    vec!["Article".to_string(), identity.ref_id.clone()],
                    vec![
                        "User".to_string(),
                        identity.user.clone().unwrap_or_else(|| "-".to_string()),
                    ],
                    vec!["Cluster".to_string(), representative.cluster.to_string()],
                    vec!["Cluster label".to_string(), representative.label.clone()],
                    vec![
                        "Cluster category".to_string(),
                        representative.category.to_string(),
                    ],
                ],
            )),
        }
    }

    /// Format links, naming each endpoint by its representative label.
    pub fn format_links(&self, links: &[(Link, String, String)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(
                &links
                    .iter()
                    .map(|(link, source_label, target_label)| {
                        json!({
                            "source": link.source.to_string(),
                            "source_label": source_label,
                            "target": link.target.to_string(),
                            "target_label": target_label,
                            "type": link.link_type.as_str(),
                            "user": link.user,
                            "created_at": link.created_at,
                        })
                    })
                    .collect::<Vec<_>>(),
            )?),
            OutputFormat::Quiet => Ok(join_lines(links.iter().map(|(link, _, _)| {
                format!("{} {} {}", link.source, link.link_type, link.target)
            }))),
            OutputFormat::Table => {
                if links.is_empty() {
                    return Ok(self.colorize("No links found.", "yellow"));
                }
                Ok(self.table(
                    &["Source", "Relation", "Target", "Type", "User"],
                    links.iter().map(|(link, source_label, target_label)| {
                        vec![
                            source_label.clone(),
                            link.link_type.phrase().to_string(),
                            target_label.clone(),
                            link.link_type.as_str().to_string(),
                            link.user.clone().unwrap_or_else(|| "-".to_string()),
                        ]
                    }),
                ))
            }
        }
    }

    /// Format the link type vocabulary.
    pub fn format_link_types(&self, types: &[LinkType]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(
                &types
                    .iter()
                    .map(|t| json!({ "name": t.as_str(), "label": t.label(), "phrase": t.phrase() }))
                    .collect::<Vec<_>>(),
            )?),
            OutputFormat::Quiet => Ok(join_lines(types.iter().map(|t| t.as_str().to_string()))),
            OutputFormat::Table => Ok(self.table(
                &["Name", "Label", "Phrase"],
                types.iter().map(|t| {
                    vec![
                        t.as_str().to_string(),
                        t.label().to_string(),
                        t.phrase().to_string(),
                    ]
                }),
            )),
        }
    }

    /// Format the result of a merge or split.
    pub fn format_outcome(&self, message: &str, cluster: ClusterId) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "message": message,
                "cluster": cluster.to_string(),
            }))?),
            OutputFormat::Quiet => Ok(cluster.to_string()),
            OutputFormat::Table => Ok(self.success(&format!("{}: {}", message, cluster))),
        }
    }

    /// Format an ingestion report.
    pub fn format_report(&self, report: &IngestReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "articles": report.articles,
                "skipped": report.skipped,
                "tags": report.tags,
                "identities": report.identities,
                "rejected": report.rejected,
                "merged": report.merged,
            }))?),
            OutputFormat::Quiet => Ok(report.articles.to_string()),
            OutputFormat::Table => {
                let summary = self.success(&report.summary());
                if report.skipped > 0 {
                    let note = self.warning(&format!(
                        "{} record(s) skipped; rerun with --verbose for details",
                        report.skipped
                    ));
                    Ok(format!("{}\n{}", summary, note))
                } else {
                    Ok(summary)
                }
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Render rows under a centered header.
    fn table<I>(&self, header: &[&str], rows: I) -> String
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut builder = Builder::default();
        builder.push_record(header.iter().copied());
        for row in rows {
            builder.push_record(row);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn join_lines(lines: impl Iterator<Item = String>) -> String {
    lines.collect::<Vec<_>>().join("\n")
}

fn identity_json(identity: &Identity) -> Value {
    json!({
        "id": identity.id.to_string(),
        "key": identity.key,
        "ref_id": identity.ref_id,
        "cluster": identity.cluster.to_string(),
        "label": identity.label,
        "category": identity.category.as_str(),
        "user": identity.user,
        "timestamp": identity.timestamp,
    })
}

fn representative_json(representative: &Representative) -> Value {
    json!({
        "cluster": representative.cluster.to_string(),
        "label": representative.label,
        "category": representative.category.as_str(),
    })
}

fn ref_tag_json(tag: &RefTag) -> Value {
    json!({
        "ref": {
            "id": tag.ref_.id,
            "site": tag.ref_.site,
            "url": tag.ref_.url,
            "title": tag.ref_.title,
        },
        "key": tag.key,
        "text": tag.text,
        "category": tag.category.as_str(),
        "count": tag.count,
        "identity": tag.identity.map(|id| id.to_string()),
        "cluster": tag.cluster.map(|id| id.to_string()),
    })
}
