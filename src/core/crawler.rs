//! Province → school → major crawl of the subject-requirement site.

use crate::config::toml_config::{CrawlConfig, SourcesConfig};
use crate::core::extract::{AnchorPattern, CellPattern, TablePattern};
use crate::core::markup::normalize_text;
use crate::domain::model::{CrawlFailure, CrawlOutcome, Major, NodeKind, Province, Route, School};
use crate::domain::ports::Fetcher;
use crate::utils::error::{EtlError, Result};
use url::Url;

const PROVINCE_BLOCK: &str = r#"(?sU)<table class="linner"[^>]*>(.*)</table>"#;
const PROVINCE_LINK: &str = r"(?U)<a href='(area_\d+\.html)'\s*[^>]*>(.*)</a>";

const SCHOOL_BLOCK: &str = r#"(?sU)<table class="lsch"[^>]*>(.*)</table>"#;
const SCHOOL_ROW: &str = r"(?sU)<tr [^>]*>(.*)</tr>";
const SCHOOL_CELLS: &str =
    r"(?sU)<td>(.*)</td>\s*<td>(.*)</td>\s*<td>(.*)</td>\s*<td>(.*)</td>";
const SCHOOL_LINK: &str = r#"(?sU)<a href="([^>]*)" target="_blank"\s*>(.*)</a>"#;

const MAJOR_BLOCK: &str = r#"(?sU)<table width="100%" class="lgoto"[^>]*>(.*)</table>"#;
const MAJOR_ROW: &str = r"(?sU)<tr [^>]*>(.*)</tr>";
const MAJOR_CELLS: &str = r"(?sU)<td [^>]*>(.*)</td>\s*<td [^>]*>(.*)</td>\s*<td [^>]*>(.*)</td>\s*<td [^>]*>(.*)</td>";

/// Success with the node's children, or the reason the node was dropped.
pub type NodeResult<T> = std::result::Result<T, CrawlFailure>;

pub struct Crawler<'a, F: Fetcher> {
    fetcher: &'a F,
    entry_url: String,
    origin: Url,
    fail_fast: bool,
    provinces: TablePattern,
    schools: TablePattern,
    school_link: AnchorPattern,
    majors: TablePattern,
}

impl<'a, F: Fetcher> Crawler<'a, F> {
    pub fn new(fetcher: &'a F, sources: &SourcesConfig, crawl: &CrawlConfig) -> Result<Self> {
        let origin = Url::parse(&sources.origin).map_err(|e| EtlError::InvalidConfigValueError {
            field: "sources.origin".to_string(),
            value: sources.origin.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            fetcher,
            entry_url: sources.entry_url.clone(),
            origin,
            fail_fast: crawl.fail_fast,
            provinces: TablePattern::new(
                PROVINCE_BLOCK,
                PROVINCE_LINK,
                CellPattern::sequence(PROVINCE_LINK)?,
            )?,
            schools: TablePattern::new(
                SCHOOL_BLOCK,
                SCHOOL_ROW,
                CellPattern::sequence(SCHOOL_CELLS)?,
            )?,
            school_link: AnchorPattern::new(SCHOOL_LINK)?,
            majors: TablePattern::new(MAJOR_BLOCK, MAJOR_ROW, CellPattern::sequence(MAJOR_CELLS)?)?
                .skip_rows(1),
        })
    }

    /// Walks every province and school in document order.
    ///
    /// A failed province or school page is recorded and its siblings are
    /// still crawled, unless `fail_fast` is set. The entry page has no
    /// siblings, so its failure is returned as an error.
    pub async fn crawl(&self) -> Result<CrawlOutcome> {
        tracing::info!("🚀 Starting crawl from: {}", self.entry_url);
        let entry = self.fetcher.fetch(&self.entry_url, Route::Direct).await?;

        let provinces = self.parse_provinces(&entry);
        tracing::info!("Found {} provinces", provinces.len());
        if provinces.is_empty() {
            tracing::warn!("⚠️ No province links on {}", self.entry_url);
        }

        let mut outcome = CrawlOutcome::default();
        for province in &provinces {
            tracing::info!("📍 Processing province {}", province.name);
            let schools = match self.crawl_province(province).await {
                Ok(schools) => schools,
                Err(failure) => {
                    self.record(&mut outcome, failure)?;
                    continue;
                }
            };

            for school in &schools {
                match self.crawl_school(school).await {
                    Ok(majors) => outcome.majors.extend(majors),
                    Err(failure) => self.record(&mut outcome, failure)?,
                }
            }
        }

        tracing::info!(
            "✅ Crawl finished: {} majors, {} failed pages",
            outcome.majors.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }

    fn record(&self, outcome: &mut CrawlOutcome, failure: CrawlFailure) -> Result<()> {
        tracing::warn!(
            "⚠️ Skipping {:?} {} ({}): {}",
            failure.kind,
            failure.name,
            failure.url,
            failure.reason
        );
        if self.fail_fast {
            return Err(EtlError::network(failure.url, failure.reason));
        }
        outcome.failures.push(failure);
        Ok(())
    }

    async fn crawl_province(&self, province: &Province) -> NodeResult<Vec<School>> {
        let markup = self
            .fetcher
            .fetch(&province.source_url, Route::Direct)
            .await
            .map_err(|e| CrawlFailure::new(NodeKind::Province, &province.name, &province.source_url, e))?;

        let schools = self.parse_schools(&markup, province);
        tracing::info!("Found {} schools in {}", schools.len(), province.name);
        Ok(schools)
    }

    async fn crawl_school(&self, school: &School) -> NodeResult<Vec<Major>> {
        tracing::info!("🏫 Processing school {} {}", school.code, school.name);
        let markup = self
            .fetcher
            .fetch(&school.source_url, Route::Direct)
            .await
            .map_err(|e| CrawlFailure::new(NodeKind::School, &school.name, &school.source_url, e))?;

        Ok(self.parse_majors(&markup, school))
    }

    pub fn parse_provinces(&self, markup: &str) -> Vec<Province> {
        self.provinces
            .extract(markup)
            .rows
            .into_iter()
            .filter_map(|cells| {
                let name = normalize_text(&cells[1]);
                let source_url = self.resolve(&cells[0])?;
                tracing::debug!("province: {} {}", name, source_url);
                Some(Province { name, source_url })
            })
            .collect()
    }

    /// 學校列表每列四欄：地區、代碼、校名、連結；第四欄需再解析一次 `<a>`
    pub fn parse_schools(&self, markup: &str, province: &Province) -> Vec<School> {
        let extraction = self.schools.extract(markup);
        if extraction.skipped > 0 {
            tracing::debug!(
                "Skipped {} school rows in {}",
                extraction.skipped,
                province.name
            );
        }

        extraction
            .rows
            .into_iter()
            .filter_map(|cells| {
                let Some(link) = self.school_link.extract(&cells[3]) else {
                    tracing::debug!("No detail link for school {}", cells[2]);
                    return None;
                };
                let school = School {
                    name: normalize_text(&cells[2]),
                    source_url: self.resolve(&link.href)?,
                    code: normalize_text(&cells[1]),
                    area: province.name.clone(),
                };
                tracing::debug!("school: {} {} {}", school.code, school.name, normalize_text(&cells[0]));
                Some(school)
            })
            .collect()
    }

    /// 第一列是表頭；欄位順序依序為層次、專業名稱、選考要求、所含專業
    pub fn parse_majors(&self, markup: &str, school: &School) -> Vec<Major> {
        let extraction = self.majors.extract(markup);
        if !extraction.block_found {
            tracing::warn!("⚠️ No major table for {} ({})", school.name, school.source_url);
        }

        extraction
            .rows
            .into_iter()
            .map(|mut cells| {
                let subjects = cells.pop().unwrap_or_default();
                let requirement_spec = cells.pop().unwrap_or_default();
                let name = cells.pop().unwrap_or_default();
                let level = cells.pop().unwrap_or_default();
                let major = Major {
                    area: school.area.clone(),
                    school_name: school.name.clone(),
                    name,
                    subjects,
                    level,
                    requirement_spec,
                };
                tracing::debug!("major: {} {} {}", major.school_name, major.name, major.level);
                major
            })
            .collect()
    }

    fn resolve(&self, href: &str) -> Option<String> {
        match self.origin.join(href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::warn!("⚠️ Unresolvable link '{}': {}", href, e);
                None
            }
        }
    }
}
