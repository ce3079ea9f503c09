pub mod d500_executive_summary;

pub use d500_executive_summary::ui::ExecutiveSummaryDashboard;
