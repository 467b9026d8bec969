//! Self-contained HTML report of a feature selection run.
use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

use crate::config::SelectionConfig;
use crate::data_handling::InputData;
use crate::report::plots::{plot_feature_ranks, plot_validation_curves};
use crate::results::FeatureSelectionResults;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";
const MAX_RANK_BARS: usize = 30;

/// A titled block of the report holding markup and plots.
pub struct ReportSection {
    title: String,
    content: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            content: Vec::new(),
        }
    }

    pub fn add_content(&mut self, markup: Markup) {
        self.content.push(markup);
    }

    pub fn add_plot(&mut self, plot: Plot) {
        let div_id = format!("plot-{}-{}", slug(&self.title), self.content.len());
        self.content
            .push(PreEscaped(plot.to_inline_html(Some(div_id.as_str()))));
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content {
                    div class="block" { (block) }
                }
            }
        }
    }
}

pub struct Report {
    title: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(title: &str) -> Self {
        Report {
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> String {
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let page = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style {
                        "body { font-family: sans-serif; margin: 2em auto; max-width: 1100px; }
                         table { border-collapse: collapse; }
                         td, th { border: 1px solid #ccc; padding: 4px 10px; text-align: left; }
                         .block { margin-bottom: 1.5em; }"
                    }
                }
                body {
                    h1 { (self.title) }
                    p { "Generated " (generated) }
                    @for section in &self.sections {
                        (section.render())
                    }
                }
            }
        };
        page.into_string()
    }
}

/// HTML page summarising `results`: the run configuration, the min/mid/max
/// feature sets with their outer test scores and the validation and rank plots.
pub fn render_report(results: &FeatureSelectionResults, input: &InputData, config: &SelectionConfig) -> String {
    let mut report = Report::new("Omigami feature selection report");

    let mut overview = ReportSection::new("Overview");
    overview.add_content(html! {
        p {
            (input.n_samples()) " samples, " (results.n_features) " features, "
            (input.class_names.len()) " classes."
        }
        table {
            tr { th { "Parameter" } th { "Value" } }
            tr { td { "Model" } td { (format!("{:?}", config.model.model_type)) } }
            tr { td { "Metric" } td { (config.metric) } }
            tr { td { "Outer / inner folds" } td { (config.n_outer) " / " (config.n_inner) } }
            tr { td { "Repetitions" } td { (config.n_repetitions) } }
            tr { td { "Dropout rate" } td { (config.dropout_rate) } }
            tr { td { "Robust minimum" } td { (config.robust_minimum) } }
            tr { td { "Random state" } td { (config.random_state) } }
        }
    });
    report.add_section(overview);

    let names = results.feature_names(input);
    let mut selection = ReportSection::new("Selected features");
    selection.add_content(html! {
        table {
            tr { th { "Set" } th { "Size" } th { "Mean outer test score" } th { "Features" } }
            @for ((kind, features), (_, score)) in names.iter().zip(results.test_scores.iter()) {
                tr {
                    td { (kind) }
                    td { (features.len()) }
                    td { (format!("{:.4}", score)) }
                    td { (features.join(", ")) }
                }
            }
        }
    });
    report.add_section(selection);

    let mut curves = ReportSection::new("Validation curves");
    curves.add_plot(plot_validation_curves(results, "Score vs number of features"));
    report.add_section(curves);

    let mut ranks = ReportSection::new("Feature ranks");
    ranks.add_plot(plot_feature_ranks(
        &results.avg_ranks.mid,
        &input.feature_names,
        MAX_RANK_BARS,
        "Average rank (mid selection)",
    ));
    report.add_section(ranks);

    report.render()
}

fn slug(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}
