use twine_core::Model;

use super::{ClimateController, MeasurementSnapshot, StepError, StepReport};

/// [`twine_core::Model`] adapter over [`ClimateController::step`].
///
/// The controller state travels with the input and the advanced state comes
/// back with the output, so calling the model never mutates its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClimateControl;

/// Input to [`ClimateControl`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateInput {
    pub controller: ClimateController,
    pub measurements: MeasurementSnapshot,
}

/// Output of [`ClimateControl`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateOutput {
    /// Controller state after the step, to feed into the next call.
    pub controller: ClimateController,
    pub report: StepReport,
}

impl Model for ClimateControl {
    type Input = ClimateInput;
    type Output = ClimateOutput;
    type Error = StepError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let mut controller = input.controller.clone();
        let report = controller.step(&input.measurements)?;
        Ok(ClimateOutput { controller, report })
    }
}
