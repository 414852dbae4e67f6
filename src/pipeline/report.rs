use crate::domain::Ohlc;
use crate::pipeline::forecast::ForecastReport;

/// A titled block of report text, revealed line by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub title: &'static str,
    pub lines: Vec<String>,
}

fn ohlc_lines(ohlc: &Ohlc) -> Vec<String> {
    vec![
        format!("Open: {:.2}", ohlc.open),
        format!("High: {:.2}", ohlc.high),
        format!("Low: {:.2}", ohlc.low),
        format!("Close: {:.2}", ohlc.close),
    ]
}

pub fn report_sections(report: &ForecastReport) -> Vec<ReportSection> {
    let p = &report.best_params;
    vec![
        ReportSection {
            title: "Best Parameters",
            lines: vec![
                format!("Hidden Dimension: {}", p.hidden_dim),
                format!("Number of Layers: {}", p.num_layers),
                format!("Learning Rate: {}", p.learning_rate),
            ],
        },
        ReportSection {
            title: "Validation Loss",
            lines: vec![format!("{:.4}", report.validation_loss)],
        },
        ReportSection {
            title: "Actual Values",
            lines: ohlc_lines(&report.actual),
        },
        ReportSection {
            title: "Predicted Next Values",
            lines: ohlc_lines(&report.predicted),
        },
    ]
}

/// Flattened report: each section title (with a trailing colon) then its lines.
pub fn report_lines(report: &ForecastReport) -> Vec<String> {
    report_sections(report)
        .into_iter()
        .flat_map(|section| std::iter::once(format!("{}:", section.title)).chain(section.lines))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DataKey;
    use crate::nn::ComputeDevice;
    use crate::pipeline::forecast::ForecastRequest;
    use crate::tuning::{AcquisitionKind, HyperParams};
    use chrono::NaiveDate;
    use std::time::Duration;

    fn report() -> ForecastReport {
        ForecastReport {
            request: ForecastRequest {
                key: DataKey::new(
                    "SPY",
                    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                ),
                seq_length: 60,
                device: ComputeDevice::Cpu,
                prefer_api: false,
                acquisition: AcquisitionKind::Ucb,
            },
            source: "test".to_string(),
            n_bars: 1258,
            n_rows: 1225,
            best_params: HyperParams {
                hidden_dim: 42,
                num_layers: 3,
                learning_rate: 0.00215,
            },
            validation_loss: 0.0123456,
            actual: Ohlc {
                open: 590.1,
                high: 592.456,
                low: 587.0,
                close: 591.999,
            },
            predicted: Ohlc {
                open: 589.0,
                high: 593.1,
                low: 586.25,
                close: 590.004,
            },
            trials: Vec::new(),
            validation_curve: Vec::new(),
            elapsed: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_sections_and_precision() {
        let sections = report_sections(&report());
        let titles: Vec<_> = sections.iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            ["Best Parameters", "Validation Loss", "Actual Values", "Predicted Next Values"]
        );
        assert_eq!(
            sections[0].lines,
            ["Hidden Dimension: 42", "Number of Layers: 3", "Learning Rate: 0.00215"]
        );
        assert_eq!(sections[1].lines, ["0.0123"]);
        assert_eq!(
            sections[2].lines,
            ["Open: 590.10", "High: 592.46", "Low: 587.00", "Close: 592.00"]
        );
        assert_eq!(sections[3].lines[3], "Close: 590.00");
    }

    #[test]
    fn test_lines_put_titles_before_their_values() {
        let lines = report_lines(&report());
        assert_eq!(lines.len(), 4 + 3 + 1 + 4 + 4);
        assert_eq!(lines[0], "Best Parameters:");
        assert_eq!(lines[4], "Validation Loss:");
        assert_eq!(lines[5], "0.0123");
        assert_eq!(lines.last().map(String::as_str), Some("Close: 590.00"));
    }
}
