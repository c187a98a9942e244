// Identity is owned by Supabase Auth. This module only verifies the JWTs it
// issues and relays sign-up/sign-in calls to its REST API.

pub mod extractor;
pub mod handlers;
pub mod jwt;
pub mod supabase;

pub use extractor::AuthUser;
pub use jwt::JwtVerifier;
pub use supabase::SupabaseAuth;
