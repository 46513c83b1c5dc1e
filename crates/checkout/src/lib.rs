pub mod draft;
pub mod routing;
pub mod submission;
pub mod wizard;

pub use draft::{CheckoutFlow, ContactField, OrderDraft};
pub use routing::{PaymentAction, PaymentMethod, PaymentRouter};
pub use submission::{SubmissionClient, SubmissionReceipt, SubmissionRequest, Web3FormsClient};
pub use wizard::{CheckoutStep, CheckoutWizard, SubmitOutcome};
