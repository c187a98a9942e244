// Caller-scoped profile endpoints and the small per-user collections
// (notes, fields, schools, complementary information).

pub mod extras;
pub mod handlers;
