//! Version resolution against the Node.js release index and release schedule.

use super::range::Range;
use super::VersionResolver;
use crate::error::{DetectError, Result};
use crate::http::HttpClient;
use chrono::{NaiveDate, Utc};
use semver::Version;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

/// One entry of the dist index (`index.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct IndexEntry {
    pub version: String,
    #[serde(default)]
    pub lts: LtsField,
}

/// `lts` is `false` for non-LTS releases and the line's codename otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum LtsField {
    #[default]
    None,
    Flag(bool),
    Codename(String),
}

impl LtsField {
    fn codename(&self) -> Option<&str> {
        match self {
            LtsField::Codename(name) => Some(name),
            _ => None,
        }
    }
}

/// One release line of the schedule (`schedule.json`), keyed by `v<major>` or `v0.<minor>`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleEntry {
    pub start: NaiveDate,
    #[serde(default)]
    pub lts: Option<NaiveDate>,
    #[serde(default)]
    pub maintenance: Option<NaiveDate>,
    pub end: NaiveDate,
    #[serde(default)]
    pub codename: Option<String>,
}

impl ScheduleEntry {
    fn is_current(&self, today: NaiveDate) -> bool {
        let until = self.lts.or(self.maintenance).unwrap_or(self.end);
        self.start <= today && today < until
    }

    fn is_lts_active(&self, today: NaiveDate) -> bool {
        match self.lts {
            Some(lts) => lts <= today && today < self.maintenance.unwrap_or(self.end),
            None => false,
        }
    }

    fn is_maintenance(&self, today: NaiveDate) -> bool {
        match self.maintenance {
            Some(maintenance) => maintenance <= today && today < self.end,
            None => false,
        }
    }

    fn is_supported(&self, today: NaiveDate) -> bool {
        self.start <= today && today < self.end
    }
}

#[derive(Debug, Clone)]
struct Release {
    version: Version,
    lts: Option<String>,
}

impl Release {
    /// Schedule key of the release's line.
    fn line(&self) -> String {
        if self.version.major == 0 {
            format!("v0.{}", self.version.minor)
        } else {
            format!("v{}", self.version.major)
        }
    }
}

#[derive(Debug, Clone)]
struct ReleaseData {
    /// Sorted ascending.
    releases: Vec<Release>,
    schedule: BTreeMap<String, ScheduleEntry>,
}

impl ReleaseData {
    fn new(index: Vec<IndexEntry>, schedule: BTreeMap<String, ScheduleEntry>) -> Self {
        let mut releases: Vec<Release> = index
            .into_iter()
            .filter_map(|entry| {
                let version = entry.version.strip_prefix('v').unwrap_or(&entry.version);
                Some(Release {
                    version: Version::parse(version).ok()?,
                    lts: entry.lts.codename().map(str::to_string),
                })
            })
            .collect();
        releases.sort_by(|a, b| a.version.cmp(&b.version));
        releases.dedup_by(|a, b| a.version == b.version);

        Self { releases, schedule }
    }

    fn highest(&self, filter: impl Fn(&Release) -> bool) -> Option<String> {
        self.releases
            .iter()
            .rev()
            .find(|release| filter(release))
            .map(|release| release.version.to_string())
    }

    fn line_is(&self, release: &Release, status: impl Fn(&ScheduleEntry) -> bool) -> bool {
        self.schedule.get(&release.line()).is_some_and(status)
    }

    /// LTS codenames, newest line first.
    fn lts_codenames(&self) -> Vec<&str> {
        let mut codenames: Vec<&str> = Vec::new();
        for release in self.releases.iter().rev() {
            if let Some(codename) = release.lts.as_deref() {
                if !codenames.iter().any(|c| c.eq_ignore_ascii_case(codename)) {
                    codenames.push(codename);
                }
            }
        }
        codenames
    }

    fn resolve(&self, query: &str, today: NaiveDate) -> Option<String> {
        let query = query.trim();
        let lowered = query.to_ascii_lowercase();

        match lowered.as_str() {
            "lts/*" | "lts_latest" | "lts" => return self.highest(|r| r.lts.is_some()),
            "current" => return self.highest(|r| self.line_is(r, |s| s.is_current(today))),
            "lts_active" => return self.highest(|r| self.line_is(r, |s| s.is_lts_active(today))),
            "active" => {
                return self.highest(|r| {
                    self.line_is(r, |s| s.is_current(today) || s.is_lts_active(today))
                });
            }
            "maintained" => {
                return self.highest(|r| {
                    self.line_is(r, |s| {
                        s.is_current(today) || s.is_lts_active(today) || s.is_maintenance(today)
                    })
                });
            }
            "supported" => return self.highest(|r| self.line_is(r, |s| s.is_supported(today))),
            _ => {}
        }

        if let Some(selector) = lowered.strip_prefix("lts/") {
            let codename = match selector.strip_prefix('-') {
                Some(offset) => {
                    let offset: usize = offset.parse().ok()?;
                    self.lts_codenames().get(offset)?.to_string()
                }
                None => selector.to_string(),
            };
            return self.highest(|r| {
                r.lts
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(&codename))
            });
        }

        let range = Range::parse(query)?;
        self.highest(|r| range.matches(&r.version))
    }
}

/// Resolves tokens against nodejs.org release data, fetched once on first use.
#[derive(Debug)]
pub struct NodeReleases {
    source: Option<ReleaseSource>,
    data: OnceLock<ReleaseData>,
    today: NaiveDate,
}

#[derive(Debug)]
struct ReleaseSource {
    http: HttpClient,
    index_url: String,
    schedule_url: String,
}

impl NodeReleases {
    /// Release data is fetched from `index_url` and `schedule_url` on first use.
    pub fn new(http: HttpClient, index_url: &str, schedule_url: &str) -> Self {
        Self {
            source: Some(ReleaseSource {
                http,
                index_url: index_url.to_string(),
                schedule_url: schedule_url.to_string(),
            }),
            data: OnceLock::new(),
            today: Utc::now().date_naive(),
        }
    }

    /// Resolver over already loaded data, evaluating schedules as of `today`.
    pub fn from_data(
        index: Vec<IndexEntry>,
        schedule: BTreeMap<String, ScheduleEntry>,
        today: NaiveDate,
    ) -> Self {
        let data = OnceLock::new();
        let _ = data.set(ReleaseData::new(index, schedule));
        Self {
            source: None,
            data,
            today,
        }
    }

    fn data(&self) -> Result<&ReleaseData> {
        if let Some(data) = self.data.get() {
            return Ok(data);
        }

        let source = self.source.as_ref().ok_or_else(|| {
            DetectError::LoaderError("Node.js release data is unavailable".to_string())
        })?;

        let index: Vec<IndexEntry> = source.http.get_json(&source.index_url)?.ok_or_else(|| {
            DetectError::LoaderError(format!("{} returned no release index", source.index_url))
        })?;
        let schedule: BTreeMap<String, ScheduleEntry> =
            source.http.get_json(&source.schedule_url)?.ok_or_else(|| {
                DetectError::LoaderError(format!("{} returned no schedule", source.schedule_url))
            })?;

        debug!(releases = index.len(), lines = schedule.len(), "Loaded Node.js release data");
        Ok(self.data.get_or_init(|| ReleaseData::new(index, schedule)))
    }
}

impl VersionResolver for NodeReleases {
    fn resolve(&self, token: &str) -> Result<Option<String>> {
        let resolved = self.data()?.resolve(token, self.today);
        debug!(%token, ?resolved, "Resolved");
        Ok(resolved)
    }
}
