use space_model::{
    ClaimParameters, ClassParameters, ParameterKind, ResourceClaim, ResourceClass,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::SpaceController;
use crate::{cancel::or_cancel, error::ControllerError};

impl SpaceController {
    /// Resolve the class parameters. This driver defines none.
    #[instrument(level = "debug", skip_all, fields(class = %class.name))]
    pub fn class_parameters(&self, class: &ResourceClass) -> Result<ClassParameters, ControllerError> {
        debug!("GetClassParameters called");
        Ok(ClassParameters)
    }

    /// Resolve the parameters a claim refers to, or the defaults without a reference.
    #[instrument(
        level = "debug",
        skip_all,
        fields(claim_uid = %claim.uid, claim = %claim.name, class = %class.name)
    )]
    pub async fn claim_parameters(
        &self,
        claim: &ResourceClaim,
        class: &ResourceClass,
        _class_parameters: &ClassParameters,
        cancel: &CancellationToken,
    ) -> Result<ClaimParameters, ControllerError> {
        debug!("GetClaimParameters called");
        let Some(reference) = &claim.parameters_ref else {
            return Ok(ClaimParameters::default_space());
        };

        match reference.resolve_kind()? {
            ParameterKind::SpaceClaimParameters => {
                let spec = or_cancel(
                    cancel,
                    self.parameters
                        .space_claim_parameters(&claim.namespace, &reference.name),
                )
                .await
                .ok_or_else(|| ControllerError::Canceled {
                    claim: claim.uid.clone(),
                })?
                .map_err(|source| ControllerError::UpstreamFetch {
                    kind: ParameterKind::SpaceClaimParameters.as_str(),
                    namespace: claim.namespace.clone(),
                    name: reference.name.clone(),
                    source,
                })?;

                spec.validate()?;
                Ok(ClaimParameters::Space(spec))
            }
        }
    }
}
