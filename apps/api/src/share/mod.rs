// Shareable result cards: the client renders an image, Cloudinary hosts it,
// the link is stored on the result and can be emailed.

pub mod cloudinary;
pub mod handlers;
