//! Background jobs processed by the apalis worker (`jobs work`).

mod payment_expiry;

pub use payment_expiry::{
    payment_expiry_handler, ExpirePaymentJob, PaymentExpiryQueue, PaymentQueue,
};

#[cfg(any(test, feature = "test-utils"))]
pub use payment_expiry::MockPaymentQueue;
