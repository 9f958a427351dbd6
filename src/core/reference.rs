//! School reference lists: 985, 211, the two comprehensive-university tiers,
//! the discipline-construction list, and each school's construction
//! disciplines.

use crate::config::toml_config::{CacheConfig, SourcesConfig};
use crate::core::cache::JsonCache;
use crate::core::extract::{CellPattern, TablePattern};
use crate::core::markup::normalize_text;
use crate::domain::model::{NameSet, ReferenceKind, ReferenceSets, Route, SchoolDisciplineSet};
use crate::domain::ports::{Fetcher, Storage};
use crate::utils::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const CATALOG_SEPARATOR: char = '、';

pub const TIER_A_CATALOG: &str = "北京大学、中国人民大学、清华大学、北京航空航天大学、北京理工大学、中国农业大学、北京师范大学、中央民族大学、南开大学、天津大学、大连理工大学、吉林大学、哈尔滨工业大学、复旦大学、同济大学、上海交通大学、华东师范大学、南京大学、东南大学、浙江大学、中国科学技术大学、厦门大学、山东大学、中国海洋大学、武汉大学、华中科技大学、中南大学、中山大学、华南理工大学、四川大学、重庆大学、电子科技大学、西安交通大学、西北工业大学、兰州大学、国防科技大学";

pub const TIER_B_CATALOG: &str = "东北大学、郑州大学、湖南大学、云南大学、西北农林科技大学、新疆大学";

pub const DISCIPLINE_CONSTRUCTION_CATALOG: &str = "北京交通大学、北京工业大学、北京科技大学、北京化工大学、北京邮电大学、北京林业大学、北京协和医学院、北京中医药大学、首都师范大学、北京外国语大学、中国传媒大学、中央财经大学、对外经济贸易大学、外交学院、中国人民公安大学、北京体育大学、中央音乐学院、中国音乐学院、中央美术学院、中央戏剧学院、中国政法大学、天津工业大学、天津医科大学、天津中医药大学、华北电力大学、河北工业大学、太原理工大学、内蒙古大学、辽宁大学、大连海事大学、延边大学、东北师范大学、哈尔滨工程大学、东北农业大学、东北林业大学、华东理工大学、东华大学、上海海洋大学、上海中医药大学、上海外国语大学、上海财经大学、上海体育学院、上海音乐学院、上海大学、苏州大学、南京航空航天大学、南京理工大学、中国矿业大学、南京邮电大学、河海大学、江南大学、南京林业大学、南京信息工程大学、南京农业大学、南京中医药大学、中国药科大学、南京师范大学、中国美术学院、安徽大学、合肥工业大学、福州大学、南昌大学、河南大学、中国地质大学、武汉理工大学、华中农业大学、华中师范大学、中南财经政法大学、湖南师范大学、暨南大学、广州中医药大学、华南师范大学、海南大学、广西大学、西南交通大学、西南石油大学、成都理工大学、四川农业大学、成都中医药大学、西南大学、西南财经大学、贵州大学、西藏大学、西北大学、西安电子科技大学、长安大学、陕西师范大学、青海大学、宁夏大学、石河子大学、中国石油大学、宁波大学、中国科学院大学、第二军医大学、第四军医大学";

/// 教育部公告未列出，但屬於 985
const IMPLIED_985_MEMBER: &str = "北京大学";

/// 學科名稱後的「自定」註記
const SELF_DESIGNATED_SUFFIX: &str = "（自定）";

const MOE_BLOCK: &str = r#"(?sU)<table class="MsoNormalTable"[^>]*>(.*)</table>"#;
const MOE_CELL: &str =
    r"(?sU)<td [^>]*>\s*<p [^>]*><span [^>]*>([^<>]*)</span>\s*</p>\s*</td>";

const DISCIPLINE_BLOCK: &str =
    r#"(?sU)<table class="wikitable[^>]*>(.*)“双一流”建设学科名单（按学校代码排序）(.*)</tbody>"#;
// 同一頁有多張 wikitable，目標表格是標記文字之後的第一個 tbody
const DISCIPLINE_AFTER_MARKER: &str = r"(?sU)“双一流”建设学科名单（按学校代码排序）(.*)</tbody>";
const DISCIPLINE_BODY: &str = r"(?sU)<tbody>(.*)</tbody>";
const DISCIPLINE_ROW: &str = r"(?sU)<tr>(.*)</tr>";
const DISCIPLINE_CELL: &str = r"(?sU)<td>(.*)</td>";

/// Splits a `、`-delimited literal catalog.
pub fn literal_catalog(text: &str) -> NameSet {
    text.split(CATALOG_SEPARATOR).collect()
}

/// Single-cell rows of a Ministry of Education publication table.
pub fn parse_moe_list(markup: &str) -> Result<Vec<String>> {
    // 每個儲存格就是一列
    let pattern = TablePattern::new(MOE_BLOCK, MOE_CELL, CellPattern::sequence(MOE_CELL)?)?;
    Ok(pattern
        .extract(markup)
        .rows
        .into_iter()
        .map(|cells| normalize_text(&cells[0]))
        .filter(|name| !name.is_empty())
        .collect())
}

/// School → discipline rows of the wiki construction-discipline table.
///
/// The first two rows are headers. Cell 0 holds the school, cell 2 the
/// `、`-separated discipline list.
pub fn parse_discipline_table(markup: &str) -> Result<Vec<SchoolDisciplineSet>> {
    let pattern = TablePattern::new(
        DISCIPLINE_BLOCK,
        DISCIPLINE_ROW,
        CellPattern::repeated(DISCIPLINE_CELL, 3)?,
    )?
    .within(DISCIPLINE_AFTER_MARKER)?
    .within(DISCIPLINE_BODY)?
    .skip_rows(2);

    let extraction = pattern.extract(markup);
    if extraction.skipped > 0 {
        tracing::debug!("Skipped {} discipline rows without three cells", extraction.skipped);
    }

    Ok(extraction
        .rows
        .into_iter()
        .filter_map(|cells| {
            let school_name = normalize_text(&cells[0]);
            if school_name.is_empty() {
                return None;
            }
            let disciplines = normalize_text(&cells[2])
                .split(CATALOG_SEPARATOR)
                .map(|d| d.replace(SELF_DESIGNATED_SUFFIX, "").trim().to_string())
                .filter(|d| !d.is_empty())
                .collect();
            Some(SchoolDisciplineSet {
                school_name,
                disciplines,
            })
        })
        .collect())
}

pub struct ReferenceLoader<'a, F: Fetcher, S: Storage> {
    fetcher: &'a F,
    cache: JsonCache<'a, S>,
    sources: &'a SourcesConfig,
    files: &'a CacheConfig,
}

impl<'a, F: Fetcher, S: Storage> ReferenceLoader<'a, F, S> {
    pub fn new(
        fetcher: &'a F,
        storage: &'a S,
        sources: &'a SourcesConfig,
        files: &'a CacheConfig,
    ) -> Self {
        Self {
            fetcher,
            cache: JsonCache::new(storage),
            sources,
            files,
        }
    }

    /// Loads every reference list; scraped lists come from their cache file
    /// when one is present.
    pub async fn load_reference_lists(&self) -> Result<ReferenceSets> {
        let mut project_985: NameSet = self
            .cached_or_fetch(&self.files.list_985, &self.sources.moe_985_url, Route::Direct, parse_moe_list)
            .await?
            .into_iter()
            .collect();
        if !project_985.contains(IMPLIED_985_MEMBER) {
            project_985.insert(IMPLIED_985_MEMBER);
        }

        let project_211: NameSet = self
            .cached_or_fetch(&self.files.list_211, &self.sources.moe_211_url, Route::Direct, parse_moe_list)
            .await?
            .into_iter()
            .collect();

        let disciplines: Vec<SchoolDisciplineSet> = self
            .cached_or_fetch(
                &self.files.disciplines,
                &self.sources.discipline_url,
                Route::Proxy,
                parse_discipline_table,
            )
            .await?;

        let references = ReferenceSets {
            project_985,
            project_211,
            tier_a: literal_catalog(TIER_A_CATALOG),
            tier_b: literal_catalog(TIER_B_CATALOG),
            discipline_construction: literal_catalog(DISCIPLINE_CONSTRUCTION_CATALOG),
            disciplines,
        };

        for kind in [
            ReferenceKind::Project985,
            ReferenceKind::Project211,
            ReferenceKind::TierA,
            ReferenceKind::TierB,
            ReferenceKind::DisciplineConstruction,
        ] {
            tracing::info!("📋 {} list: {} schools", kind.label(), references.set(kind).len());
        }
        tracing::info!(
            "📋 Construction disciplines: {} schools",
            references.disciplines.len()
        );

        Ok(references)
    }

    async fn cached_or_fetch<T, P>(&self, file: &str, url: &str, route: Route, parse: P) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned + Send,
        P: FnOnce(&str) -> Result<Vec<T>> + Send,
    {
        if !self.files.refresh {
            if let Some(cached) = self.cache.read_or_warn::<Vec<T>>(file).await {
                tracing::debug!("Using cached reference list {}", file);
                return Ok(cached);
            }
        }

        tracing::info!("🌐 Fetching reference list: {}", url);
        let markup = self.fetcher.fetch(url, route).await?;
        let parsed = parse(&markup)?;
        if parsed.is_empty() {
            // 空結果不寫快取，下次執行會重新抓取
            tracing::warn!("⚠️ No rows found at {}; page layout may have changed", url);
        } else {
            self.cache.write_or_warn(file, &parsed).await;
        }
        Ok(parsed)
    }
}
