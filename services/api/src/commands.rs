use crate::infra::build_profile;
use clap::Args;
use deskroute::config::AppConfig;
use deskroute::dispatch::{ClassificationPreview, CsvOutcomeStore, OutcomeRecord, OutcomeStore};
use deskroute::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Request text to classify
    #[arg(long)]
    pub(crate) text: String,
    /// Print the log-likelihood of every trained department
    #[arg(long)]
    pub(crate) scores: bool,
}

#[derive(Args, Debug)]
pub(crate) struct HistoryArgs {
    /// Requester identifier as submitted with the request
    #[arg(long)]
    pub(crate) requester_id: String,
    /// Maximum number of records to print
    #[arg(long, default_value_t = 20)]
    pub(crate) limit: usize,
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let profile = build_profile(&config.dispatch)?;

    let preview = profile.preview(&args.text);
    render_preview(&preview, args.scores);
    Ok(())
}

pub(crate) fn run_history(args: HistoryArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = CsvOutcomeStore::new(config.dispatch.store_path.clone());
    let records = store.history(&args.requester_id, args.limit)?;

    if records.is_empty() {
        println!("No recorded requests for {}", args.requester_id);
        return Ok(());
    }

    println!(
        "Requests for {} (newest first, {} shown)",
        args.requester_id,
        records.len()
    );
    for record in &records {
        println!("{}", history_line(record));
    }
    Ok(())
}

fn render_preview(preview: &ClassificationPreview, with_scores: bool) {
    println!("Department: {}", preview.predicted_department);
    println!("Recipient: {}", preview.recipient);
    if with_scores {
        println!("Scores:");
        for score in &preview.scores {
            println!("  {:<12} {:>10.4}", score.department.label(), score.log_likelihood);
        }
    }
}

fn history_line(record: &OutcomeRecord) -> String {
    format!(
        "- {} | {} | {} | {}",
        record.recorded_at.to_rfc3339(),
        record.predicted_department,
        record.delivery_status,
        record.body.replace('\n', " ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskroute::dispatch::{DeliveryStatus, DepartmentLabel, IncomingRequest};

    #[test]
    fn history_line_flattens_multiline_bodies() {
        let recorded_at = "2025-06-01T10:30:00Z".parse().expect("timestamp parses");
        let record = OutcomeRecord::new(
            IncomingRequest {
                requester_name: "Ravi".to_string(),
                requester_id: "EE22-014".to_string(),
                claimed_department: "Electrical".to_string(),
                year: "3".to_string(),
                body: "hall ticket\nnot received".to_string(),
            },
            DepartmentLabel::Examination,
            DeliveryStatus::Delivered,
            recorded_at,
        );

        let line = history_line(&record);
        assert_eq!(
            line,
            "- 2025-06-01T10:30:00+00:00 | Examination | delivered | hall ticket not received"
        );
    }
}
