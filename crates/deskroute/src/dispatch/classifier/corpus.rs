use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::dispatch::domain::{DepartmentLabel, TrainingExample, UnknownDepartment};

const BUILT_IN_CORPUS: &[(&str, DepartmentLabel)] = &[
    (
        "Requesting leave for one week due to health issues",
        DepartmentLabel::Academic,
    ),
    (
        "Application for medical leave and attendance condonation",
        DepartmentLabel::Academic,
    ),
    (
        "Request to change my elective course this semester",
        DepartmentLabel::Academic,
    ),
    (
        "Fee payment receipt not generated after online transaction",
        DepartmentLabel::Accounts,
    ),
    (
        "Refund of excess tuition fee paid twice",
        DepartmentLabel::Accounts,
    ),
    (
        "Need clarification on fee structure and payment due date",
        DepartmentLabel::Accounts,
    ),
    (
        "Hall ticket not received for the upcoming exam",
        DepartmentLabel::Examination,
    ),
    (
        "Apply for revaluation of my answer sheet marks",
        DepartmentLabel::Examination,
    ),
    (
        "Exam timetable clash between two papers",
        DepartmentLabel::Examination,
    ),
    (
        "My scholarship has not been credited yet",
        DepartmentLabel::Scholarship,
    ),
    (
        "Status of merit scholarship application pending",
        DepartmentLabel::Scholarship,
    ),
    (
        "Scholarship renewal documents submission",
        DepartmentLabel::Scholarship,
    ),
    ("Request for hostel room allocation", DepartmentLabel::Hostel),
    (
        "Complaint about mess food quality in hostel",
        DepartmentLabel::Hostel,
    ),
    (
        "Water supply problem in my hostel room",
        DepartmentLabel::Hostel,
    ),
];

/// Labeled examples the service ships with; covers every department.
pub fn default_corpus() -> Vec<TrainingExample> {
    BUILT_IN_CORPUS
        .iter()
        .map(|&(text, department)| TrainingExample::new(text, department))
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("failed to read training corpus: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid training corpus CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("training corpus row {row}: {source}")]
    Department {
        row: usize,
        #[source]
        source: UnknownDepartment,
    },
}

#[derive(Debug, Deserialize)]
struct CorpusRow {
    text: String,
    department: String,
}

/// Reads `text,department` rows. Blank texts are skipped; unknown departments fail.
pub fn load_corpus<R: Read>(reader: R) -> Result<Vec<TrainingExample>, CorpusError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut examples = Vec::new();

    for (index, row) in csv_reader.deserialize::<CorpusRow>().enumerate() {
        let row = row?;
        if row.text.is_empty() {
            continue;
        }

        let department = row
            .department
            .parse::<DepartmentLabel>()
            .map_err(|source| CorpusError::Department {
                row: index + 1,
                source,
            })?;
        examples.push(TrainingExample::new(row.text, department));
    }

    Ok(examples)
}

pub fn load_corpus_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<TrainingExample>, CorpusError> {
    let file = std::fs::File::open(path)?;
    load_corpus(file)
}
