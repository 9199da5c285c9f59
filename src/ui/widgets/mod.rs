// src/ui/widgets/mod.rs

// Module declarations for every UI widget.

pub mod analysis_view;    // Port table, vulnerability list and details.
pub mod disclaimer_popup; // Authorized-use disclaimer shown on start.
pub mod footer;           // Key hints and save status.
pub mod input;            // Target input field.
pub mod log_view;         // Tail of the log file.
pub mod reports_view;     // Browser for saved reports.
pub mod summary;          // Risk level and scan facts.
