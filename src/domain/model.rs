use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Province {
    pub name: String,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct School {
    pub name: String,
    pub source_url: String,
    pub code: String,
    pub area: String,
}

/// 一筆專業(類)的選考科目要求，也是輸出表格的一列。
///
/// 序列化欄位名稱沿用既有 `majors.json` 快取的格式。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Major {
    pub area: String,
    pub school_name: String,
    pub name: String,
    pub subjects: String,
    pub level: String,
    #[serde(rename = "Requests")]
    pub requirement_spec: String,
}

/// 一所學校的「雙一流」建設學科，順序即來源表格中的順序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SchoolDisciplineSet {
    pub school_name: String,
    #[serde(rename = "Majors")]
    pub disciplines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Project985,
    Project211,
    TierA,
    TierB,
    DisciplineConstruction,
}

impl ReferenceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Project985 => "985",
            ReferenceKind::Project211 => "211",
            ReferenceKind::TierA => "一流大学A类",
            ReferenceKind::TierB => "一流大学B类",
            ReferenceKind::DisciplineConstruction => "一流学科建设高校",
        }
    }
}

/// Append-only school-name list with exact-match lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameSet {
    ordered: Vec<String>,
    index: HashSet<String>,
}

impl NameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trims the name; blank names and duplicates are ignored.
    pub fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.index.contains(name) {
            return false;
        }
        self.index.insert(name.to_string());
        self.ordered.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name.trim())
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ordered
    }
}

impl<S: AsRef<str>> FromIterator<S> for NameSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = NameSet::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

/// The five school lists plus the per-school discipline mapping.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSets {
    pub project_985: NameSet,
    pub project_211: NameSet,
    pub tier_a: NameSet,
    pub tier_b: NameSet,
    pub discipline_construction: NameSet,
    pub disciplines: Vec<SchoolDisciplineSet>,
}

impl ReferenceSets {
    pub fn set(&self, kind: ReferenceKind) -> &NameSet {
        match kind {
            ReferenceKind::Project985 => &self.project_985,
            ReferenceKind::Project211 => &self.project_211,
            ReferenceKind::TierA => &self.tier_a,
            ReferenceKind::TierB => &self.tier_b,
            ReferenceKind::DisciplineConstruction => &self.discipline_construction,
        }
    }

    pub fn contains(&self, kind: ReferenceKind, school: &str) -> bool {
        self.set(kind).contains(school)
    }

    /// 第一筆同名學校的學科清單
    pub fn disciplines_of(&self, school: &str) -> Option<&[String]> {
        self.disciplines
            .iter()
            .find(|entry| entry.school_name == school)
            .map(|entry| entry.disciplines.as_slice())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Province,
    School,
}

/// A crawl node that could not be processed; its siblings still were.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlFailure {
    pub kind: NodeKind,
    pub name: String,
    pub url: String,
    pub reason: String,
    pub at: DateTime<Utc>,
}

impl CrawlFailure {
    pub fn new(kind: NodeKind, name: &str, url: &str, reason: impl ToString) -> Self {
        Self {
            kind,
            name: name.to_string(),
            url: url.to_string(),
            reason: reason.to_string(),
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    pub majors: Vec<Major>,
    pub failures: Vec<CrawlFailure>,
}

impl CrawlOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 抽取階段的產出：參考名單與專業資料
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub references: ReferenceSets,
    pub majors: Vec<Major>,
    pub failures: Vec<CrawlFailure>,
    pub from_cache: bool,
}

/// One flattened spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub area: String,
    pub school_name: String,
    pub school_tier: String,
    pub major_tier: String,
    pub major_name: String,
    pub subjects: String,
    pub level: String,
    pub requirement_spec: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Area,
    SchoolName,
    SchoolTier,
    MajorTier,
    MajorName,
    Subjects,
    Level,
    RequirementSpec,
}

impl ExportRow {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Area => &self.area,
            Field::SchoolName => &self.school_name,
            Field::SchoolTier => &self.school_tier,
            Field::MajorTier => &self.major_tier,
            Field::MajorName => &self.major_name,
            Field::Subjects => &self.subjects,
            Field::Level => &self.level,
            Field::RequirementSpec => &self.requirement_spec,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub field: Field,
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub rows: Vec<ExportRow>,
    pub failures: Vec<CrawlFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Direct,
    /// 經由本機代理，用於境外來源
    Proxy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_set_trims_and_dedupes() {
        let mut set = NameSet::new();
        assert!(set.insert(" 浙江大学 "));
        assert!(!set.insert("浙江大学"));
        assert!(!set.insert("   "));
        assert_eq!(set.len(), 1);
        assert!(set.contains("浙江大学"));
        assert_eq!(set.as_slice(), &["浙江大学".to_string()]);
    }

    #[test]
    fn test_major_uses_legacy_cache_keys() {
        let major = Major {
            area: "浙江".to_string(),
            school_name: "浙江大学".to_string(),
            name: "计算机类".to_string(),
            subjects: "计算机科学与技术".to_string(),
            level: "本科".to_string(),
            requirement_spec: "物理".to_string(),
        };
        let json = serde_json::to_value(&major).unwrap();
        assert_eq!(json["SchoolName"], "浙江大学");
        assert_eq!(json["Requests"], "物理");
    }

    #[test]
    fn test_major_ignores_legacy_flag_fields() {
        let json = r#"{"Area":"北京","SchoolName":"北京大学","Name":"数学类","Subjects":"",
            "Level":"本科","Requests":"物理","Is211":false,"Is985":false}"#;
        let major: Major = serde_json::from_str(json).unwrap();
        assert_eq!(major.school_name, "北京大学");
        assert_eq!(major.requirement_spec, "物理");
    }

    #[test]
    fn test_disciplines_of_returns_first_entry() {
        let refs = ReferenceSets {
            disciplines: vec![SchoolDisciplineSet {
                school_name: "北京大学".to_string(),
                disciplines: vec!["哲学".to_string()],
            }],
            ..Default::default()
        };
        assert_eq!(refs.disciplines_of("北京大学"), Some(&["哲学".to_string()][..]));
        assert!(refs.disciplines_of("清华大学").is_none());
    }
}
