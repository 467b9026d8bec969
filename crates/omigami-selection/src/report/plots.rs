use plotly::common::{Line, Mode};
use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot, Scatter};

use crate::results::{FeatureRanks, FeatureSelectionResults};

/// Score against number of features for every outer fold of every
/// repetition, with the averaged curve on top.
pub fn plot_validation_curves(results: &FeatureSelectionResults, title: &str) -> Plot {
    let mut plot = Plot::new();

    for (repetition, folds) in results.raw_results.iter().enumerate() {
        for fold in folds {
            let (x, y): (Vec<usize>, Vec<f64>) = fold.score_vs_feats.iter().map(|(&n, &s)| (n, s)).unzip();
            let name = format!("repetition {} / fold {}", repetition, fold.outer_index);
            let trace = Scatter::new(x, y)
                .mode(Mode::Lines)
                .opacity(0.4)
                .line(Line::new().width(1.0))
                .name(&name)
                .show_legend(false);
            plot.add_trace(trace);
        }
    }

    let (x, y): (Vec<usize>, Vec<f64>) = results.score_vs_feats.iter().map(|(&n, &s)| (n, s)).unzip();
    let average = Scatter::new(x, y)
        .mode(Mode::LinesMarkers)
        .line(Line::new().width(3.0).color("black"))
        .name("Average");
    plot.add_trace(average);

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Number of features"))
        .y_axis(Axis::new().title("Score"));
    plot.set_layout(layout);
    plot
}

/// Bar chart of averaged ranks, best feature first. `names` is indexed by
/// feature id; `top_n` limits the number of bars.
pub fn plot_feature_ranks(ranks: &FeatureRanks, names: &[String], top_n: usize, title: &str) -> Plot {
    let mut sorted: Vec<(usize, f64)> = ranks.data().iter().map(|(&f, &r)| (f, r)).collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
    sorted.truncate(top_n);

    let labels: Vec<String> = sorted
        .iter()
        .map(|(f, _)| names.get(*f).cloned().unwrap_or_else(|| format!("feature_{}", f)))
        .collect();
    let values: Vec<f64> = sorted.iter().map(|(_, r)| *r).collect();

    let mut plot = Plot::new();
    plot.add_trace(Bar::new(labels, values).name("Average rank"));
    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("Feature"))
            .y_axis(Axis::new().title("Average rank")),
    );
    plot
}
