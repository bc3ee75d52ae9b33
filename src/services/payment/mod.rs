pub mod stripe;

pub use stripe::{PaymentError, PaymentGateway, StripeClient, price_to_cents};
