pub mod payment_expiry;
