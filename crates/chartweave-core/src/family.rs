use serde::{Deserialize, Serialize};

/// The four structural families a chart type reshapes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChartFamily {
    Cartesian,
    Pie,
    Radar,
    Gauge,
}

const CARTESIAN_KEYWORDS: &[&str] = &["line", "bar", "area", "column", "stack"];
const PIE_KEYWORDS: &[&str] = &["pie", "doughnut", "ring", "rose"];
const RADAR_KEYWORDS: &[&str] = &["radar", "polar"];
const GAUGE_KEYWORDS: &[&str] = &["gauge", "meter", "speedometer"];

impl ChartFamily {
    pub const ALL: [ChartFamily; 4] = [
        ChartFamily::Cartesian,
        ChartFamily::Pie,
        ChartFamily::Radar,
        ChartFamily::Gauge,
    ];

    /// Infers the family from a chart type identifier such as `stacked_bar_chart`.
    ///
    /// Matching is case-insensitive and substring based. Families are tried in declaration order,
    /// so `gauge` identifiers that also mention `bar` still land on `Cartesian`. Unknown
    /// identifiers fall back to `Cartesian`.
    pub fn infer_from_chart_type(chart_type: &str) -> Self {
        let lower = chart_type.trim().to_ascii_lowercase();
        if lower.is_empty() {
            return Self::Cartesian;
        }
        Self::ALL
            .into_iter()
            .find(|family| family.keywords().iter().any(|kw| lower.contains(kw)))
            .unwrap_or(Self::Cartesian)
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Cartesian => "CARTESIAN",
            Self::Pie => "PIE",
            Self::Radar => "RADAR",
            Self::Gauge => "GAUGE",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Cartesian => "line, bar and area charts on an x/y grid",
            Self::Pie => "pie, doughnut and rose charts",
            Self::Radar => "radar charts on a polar indicator block",
            Self::Gauge => "single-value gauge charts",
        }
    }

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Cartesian => CARTESIAN_KEYWORDS,
            Self::Pie => PIE_KEYWORDS,
            Self::Radar => RADAR_KEYWORDS,
            Self::Gauge => GAUGE_KEYWORDS,
        }
    }

    pub fn supported_chart_types(self) -> &'static [&'static str] {
        match self {
            Self::Cartesian => &[
                "basic_line_chart",
                "smooth_line_chart",
                "stacked_line_chart",
                "basic_bar_chart",
                "stacked_bar_chart",
                "basic_area_chart",
            ],
            Self::Pie => &["basic_pie_chart", "doughnut_chart", "rose_chart"],
            Self::Radar => &["basic_radar_chart", "filled_radar_chart"],
            Self::Gauge => &[
                "basic_gauge_chart",
                "progress_gauge_chart",
                "grade_gauge_chart",
            ],
        }
    }

    pub fn supports(self, chart_type: &str) -> bool {
        self.supported_chart_types().contains(&chart_type)
    }

    /// Whether skeletons of this family carry an `xAxis` and therefore a `grid`.
    pub fn has_axes(self) -> bool {
        matches!(self, Self::Cartesian)
    }
}

impl std::fmt::Display for ChartFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for ChartFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown chart family: {s}"))
    }
}
