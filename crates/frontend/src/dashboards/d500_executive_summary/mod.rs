pub mod api;
pub mod ui;

/// Megabrands shown as matrix columns: (request code, display name).
pub const BRANDS: [(&str, &str); 8] = [
    ("BDL", "Bud Light"),
    ("BHL", "Busch Light"),
    ("MUL", "Michelob Ultra"),
    ("BUD", "Budweiser"),
    ("CWFM", "Cutwater"),
    ("KGA", "Big Wave"),
    ("NUTRL", "NUTRL"),
    ("STA", "Stella Artois"),
];
