//! Dashboard palette, shared by the stylesheet variables and chart datasets.

pub struct ChartColor {
    pub fill: &'static str,
    pub border: &'static str,
}

pub const GREEN: ChartColor = ChartColor {
    fill: "rgba(34, 197, 94, 0.75)",
    border: "rgba(34, 197, 94, 1)",
};

pub const BLUE: ChartColor = ChartColor {
    fill: "rgba(96, 165, 250, 0.75)",
    border: "rgba(96, 165, 250, 1)",
};

pub const PURPLE: ChartColor = ChartColor {
    fill: "rgba(168, 85, 247, 0.75)",
    border: "rgba(168, 85, 247, 1)",
};

pub const AXIS_TEXT: &str = "rgba(226, 232, 240, 0.87)";
pub const AXIS_TEXT_MUTED: &str = "rgba(226, 232, 240, 0.7)";
pub const GRID_LINE: &str = "rgba(96, 165, 250, 0.1)";

/// CSS custom properties injected ahead of the static stylesheet.
pub const ROOT_VARIABLES: &str = r#"
:root {
    --color-bg-primary: #0b1120;
    --color-bg-secondary: #111a2e;
    --color-surface: #16213a;
    --color-surface-muted: #1c2a47;
    --color-border: rgba(96, 165, 250, 0.25);
    --color-text-primary: #e2e8f0;
    --color-text-muted: #94a3b8;
    --color-accent: #60a5fa;
    --color-success: #22c55e;
    --color-info: #60a5fa;
    --color-danger: #f87171;
    --color-chat-user-bg: #1d4ed8;
    --color-chat-bot-bg: #1c2a47;
}
"#;
