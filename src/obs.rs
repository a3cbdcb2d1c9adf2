//! Observability helpers for key-manager operations.
//!
//! # Feature Flags
//!
//! - Spans named `oauth2_key_manager.operation` are always emitted through `tracing`, carrying the
//!   `operation` and `stage` fields.
//! - Enable `metrics` to increment the `oauth2_key_manager_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Operations performed by the key manager, used for spans, metrics, and error context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Initial configuration load.
	LoadConfiguration,
	/// Resource-server provisioning.
	ProvisionResourceServer,
	/// Dynamic client registration.
	CreateApplication,
	/// Client update.
	UpdateApplication,
	/// Client deletion.
	DeleteApplication,
	/// Client lookup.
	RetrieveApplication,
	/// Client secret rotation.
	RegenerateSecret,
	/// Application token issuance.
	IssueToken,
	/// Management API token exchange.
	ManagementToken,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::LoadConfiguration => "load_configuration",
			OperationKind::ProvisionResourceServer => "provision_resource_server",
			OperationKind::CreateApplication => "create_application",
			OperationKind::UpdateApplication => "update_application",
			OperationKind::DeleteApplication => "delete_application",
			OperationKind::RetrieveApplication => "retrieve_application",
			OperationKind::RegenerateSecret => "regenerate_secret",
			OperationKind::IssueToken => "issue_token",
			OperationKind::ManagementToken => "management_token",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to a key-manager operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span and records attempt/success/failure outcomes.
pub(crate) async fn observe<T, Fut>(kind: OperationKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(kind, stage);

	record_operation_outcome(kind, OperationOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_operation_outcome(kind, OperationOutcome::Success),
		Err(e) => {
			::tracing::debug!(operation = kind.as_str(), error = %e, "Operation failed.");

			record_operation_outcome(kind, OperationOutcome::Failure);
		},
	}

	result
}
