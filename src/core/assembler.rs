use crate::core::classifier::Classifier;
use crate::domain::model::{Column, ExportRow, Field, Major};

/// 輸出欄位順序與表頭
pub const COLUMNS: [Column; 8] = [
    Column { header: "省份", field: Field::Area },
    Column { header: "院校名称", field: Field::SchoolName },
    Column { header: "院校类型", field: Field::SchoolTier },
    Column { header: "专业特点", field: Field::MajorTier },
    Column { header: "专业（类）名称", field: Field::MajorName },
    Column { header: "类中所含专业", field: Field::Subjects },
    Column { header: "层次", field: Field::Level },
    Column { header: "选科科目要求", field: Field::RequirementSpec },
];

/// One row per major, in crawl order.
pub fn assemble(majors: &[Major], classifier: &Classifier<'_>) -> Vec<ExportRow> {
    majors
        .iter()
        .map(|major| ExportRow {
            area: major.area.clone(),
            school_name: major.school_name.clone(),
            school_tier: classifier.classify_school(&major.school_name),
            major_tier: classifier.classify_major(&major.school_name, &major.name, &major.subjects),
            major_name: major.name.clone(),
            subjects: major.subjects.clone(),
            level: major.level.clone(),
            requirement_spec: major.requirement_spec.clone(),
        })
        .collect()
}
