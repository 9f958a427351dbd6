use crate::domain::model::{ReferenceKind, ReferenceSets};

pub const LABEL_985: &str = "985";
pub const LABEL_211: &str = "211";
pub const LABEL_TIER_A: &str = "一流大学";
pub const LABEL_TIER_B: &str = "一流大学B类";
pub const LABEL_DISCIPLINE_CONSTRUCTION: &str = "一流学科建设高校";
pub const MAJOR_LABEL_PREFIX: &str = "一流学科-";
pub const SEPARATOR: &str = "、";

/// Annotates schools and majors from the reference lists.
pub struct Classifier<'a> {
    refs: &'a ReferenceSets,
}

fn join(left: String, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (_, true) => left,
        (true, false) => right.to_string(),
        (false, false) => format!("{}{}{}", left, SEPARATOR, right),
    }
}

impl<'a> Classifier<'a> {
    pub fn new(refs: &'a ReferenceSets) -> Self {
        Self { refs }
    }

    /// 985/211 part joined with the tier part, e.g. `985、211、一流大学`.
    ///
    /// A school with both a comprehensive-tier label and the
    /// discipline-construction flag gets the plain `一流大学` label. This
    /// also applies to Tier-B schools, and a school listed in both tiers
    /// gets `一流大学、一流大学B类`; both behaviours are kept as observed.
    pub fn classify_school(&self, name: &str) -> String {
        let mut project = String::new();
        if self.refs.contains(ReferenceKind::Project985, name) {
            project = join(project, LABEL_985);
        }
        if self.refs.contains(ReferenceKind::Project211, name) {
            project = join(project, LABEL_211);
        }

        let mut tier = String::new();
        if self.refs.contains(ReferenceKind::TierA, name) {
            tier = join(tier, LABEL_TIER_A);
        }
        if self.refs.contains(ReferenceKind::TierB, name) {
            tier = join(tier, LABEL_TIER_B);
        }

        let construction = self.refs.contains(ReferenceKind::DisciplineConstruction, name);

        match (tier.is_empty(), construction) {
            (false, true) => join(project, LABEL_TIER_A),
            (false, false) => join(project, &tier),
            (true, true) => join(project, LABEL_DISCIPLINE_CONSTRUCTION),
            (true, false) => project,
        }
    }

    /// `一流学科-<discipline>` for the first listed discipline of the school
    /// that equals the major name, contains it, is contained in it, or occurs
    /// in the subjects string. List order decides, not specificity.
    pub fn classify_major(&self, school_name: &str, major_name: &str, subjects: &str) -> String {
        let Some(disciplines) = self.refs.disciplines_of(school_name) else {
            return String::new();
        };

        disciplines
            .iter()
            .find(|d| {
                d.as_str() == major_name
                    || d.contains(major_name)
                    || major_name.contains(d.as_str())
                    || subjects.contains(d.as_str())
            })
            .map(|d| format!("{}{}", MAJOR_LABEL_PREFIX, d))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{NameSet, SchoolDisciplineSet};

    fn refs() -> ReferenceSets {
        ReferenceSets {
            project_985: ["北京大学", "浙江大学", "只在985"].into_iter().collect(),
            project_211: ["北京大学", "浙江大学", "苏州大学", "郑州大学"].into_iter().collect(),
            tier_a: ["北京大学", "浙江大学", "两类都在"].into_iter().collect(),
            tier_b: ["郑州大学", "新疆大学", "两类都在"].into_iter().collect(),
            discipline_construction: ["苏州大学", "浙江大学", "新疆大学"]
                .into_iter()
                .collect::<NameSet>(),
            disciplines: vec![
                SchoolDisciplineSet {
                    school_name: "示例大学".to_string(),
                    disciplines: vec!["Engineering".to_string(), "Civil Engineering".to_string()],
                },
                SchoolDisciplineSet {
                    school_name: "北京大学".to_string(),
                    disciplines: vec!["哲学".to_string(), "化学".to_string(), "生态学".to_string()],
                },
            ],
        }
    }

    #[test]
    fn test_985_only_school_has_no_trailing_separator() {
        let refs = refs();
        assert_eq!(Classifier::new(&refs).classify_school("只在985"), "985");
    }

    #[test]
    fn test_985_211_and_tier() {
        let refs = refs();
        let classifier = Classifier::new(&refs);
        assert_eq!(classifier.classify_school("北京大学"), "985、211、一流大学");
        assert_eq!(classifier.classify_school("郑州大学"), "211、一流大学B类");
    }

    #[test]
    fn test_tier_wins_over_discipline_construction() {
        let refs = refs();
        let classifier = Classifier::new(&refs);
        assert_eq!(classifier.classify_school("浙江大学"), "985、211、一流大学");
        // B 類學校同時是建設高校時，標籤收斂為一流大学
        assert_eq!(classifier.classify_school("新疆大学"), "一流大学");
        assert!(!classifier.classify_school("新疆大学").contains(LABEL_DISCIPLINE_CONSTRUCTION));
    }

    #[test]
    fn test_discipline_construction_only() {
        let refs = refs();
        assert_eq!(
            Classifier::new(&refs).classify_school("苏州大学"),
            "211、一流学科建设高校"
        );
    }

    #[test]
    fn test_both_tiers_concatenate() {
        let refs = refs();
        assert_eq!(
            Classifier::new(&refs).classify_school("两类都在"),
            "一流大学、一流大学B类"
        );
    }

    #[test]
    fn test_unknown_school_is_empty() {
        let refs = refs();
        assert_eq!(Classifier::new(&refs).classify_school("不存在的学院"), "");
    }

    #[test]
    fn test_first_listed_discipline_wins() {
        let refs = refs();
        assert_eq!(
            Classifier::new(&refs).classify_major(
                "示例大学",
                "Civil Engineering and Architecture",
                ""
            ),
            "一流学科-Engineering"
        );
    }

    #[test]
    fn test_major_matching_rules() {
        let refs = refs();
        let classifier = Classifier::new(&refs);
        // 完全相同
        assert_eq!(classifier.classify_major("北京大学", "哲学", ""), "一流学科-哲学");
        // 學科名包含專業名
        assert_eq!(classifier.classify_major("北京大学", "生态", ""), "一流学科-生态学");
        // 專業名包含學科名
        assert_eq!(classifier.classify_major("北京大学", "化学类", ""), "一流学科-化学");
        // 所含專業包含學科名
        assert_eq!(
            classifier.classify_major("北京大学", "理科试验班", "数学、化学、物理学"),
            "一流学科-化学"
        );
        assert_eq!(classifier.classify_major("北京大学", "法学", "法学"), "");
    }

    #[test]
    fn test_major_of_unlisted_school_is_empty() {
        let refs = refs();
        assert_eq!(Classifier::new(&refs).classify_major("浙江大学", "哲学", ""), "");
    }
}
