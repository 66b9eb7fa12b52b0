//! The seam between the timing loop and a compute device.

use std::convert::Infallible;

use acorr_kernels::{
    AcorrOutput, EncodedSignal, KernelVariant, LaunchGeometry, SampleEncoding, reference_output,
};
use tracing::debug;

/// A device able to run the autocorrelation kernels.
///
/// The runner drives a backend in a fixed order: [`load`](Self::load) once
/// per encoding, then for every variant a number of
/// [`launch`](Self::launch) calls followed by one
/// [`read_output`](Self::read_output).
pub trait AcorrBackend {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short backend identifier ("opencl", "reference").
    fn name(&self) -> &'static str;

    /// Human-readable name of the selected device.
    fn device_name(&self) -> &str;

    /// Largest local work-group size the device accepts.
    fn max_work_group_size(&self) -> usize;

    /// Build the program for the signal's encoding, upload the samples and
    /// allocate an output buffer of the same length.
    fn load(&mut self, signal: &EncodedSignal) -> Result<(), Self::Error>;

    /// Overwrite the output buffer with [`AcorrOutput::poisoned`] values.
    ///
    /// Called before each variant so a kernel that writes nothing cannot be
    /// verified against the previous variant's results.
    fn reset_output(&mut self) -> Result<(), Self::Error>;

    /// Enqueue one launch of `variant` and wait for it to complete.
    fn launch(
        &mut self,
        variant: KernelVariant,
        geometry: &LaunchGeometry,
    ) -> Result<(), Self::Error>;

    /// Download the output buffer written by the last launch.
    fn read_output(&mut self) -> Result<AcorrOutput, Self::Error>;
}

/// CPU backend computing the reference result on every launch.
#[derive(Debug, Default)]
pub struct ReferenceBackend {
    signal: Option<EncodedSignal>,
    output: Option<AcorrOutput>,
    launches: u64,
}

impl ReferenceBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total launches since construction.
    pub fn launches(&self) -> u64 {
        self.launches
    }

    /// Encoding of the currently loaded signal.
    pub fn loaded_encoding(&self) -> Option<SampleEncoding> {
        self.signal.as_ref().map(EncodedSignal::encoding)
    }
}

impl AcorrBackend for ReferenceBackend {
    type Error = Infallible;

    fn name(&self) -> &'static str {
        "reference"
    }

    fn device_name(&self) -> &str {
        "CPU reference"
    }

    fn max_work_group_size(&self) -> usize {
        usize::MAX
    }

    fn load(&mut self, signal: &EncodedSignal) -> Result<(), Infallible> {
        debug!(encoding = %signal.encoding(), samples = signal.len(), "reference load");
        self.output = Some(AcorrOutput::zeroed(signal.encoding(), signal.len()));
        self.signal = Some(signal.clone());
        Ok(())
    }

    fn reset_output(&mut self) -> Result<(), Infallible> {
        if let Some(signal) = &self.signal {
            self.output = Some(AcorrOutput::poisoned(signal.encoding(), signal.len()));
        }
        Ok(())
    }

    fn launch(
        &mut self,
        _variant: KernelVariant,
        _geometry: &LaunchGeometry,
    ) -> Result<(), Infallible> {
        if let Some(signal) = &self.signal {
            self.output = Some(reference_output(signal));
        }
        self.launches += 1;
        Ok(())
    }

    fn read_output(&mut self) -> Result<AcorrOutput, Infallible> {
        Ok(self.output.clone().unwrap_or_else(|| AcorrOutput::F32(Vec::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_zero_until_launched() {
        let mut b = ReferenceBackend::new();
        let signal = EncodedSignal::encode(&[0.5, 0.5], SampleEncoding::Q15);
        b.load(&signal).unwrap();
        assert_eq!(b.read_output().unwrap(), AcorrOutput::Q15(vec![0, 0]));
        assert_eq!(b.loaded_encoding(), Some(SampleEncoding::Q15));

        let g = KernelVariant::Naive.geometry(2, 1, SampleEncoding::Q15).unwrap();
        b.launch(KernelVariant::Naive, &g).unwrap();
        assert_eq!(b.read_output().unwrap(), AcorrOutput::Q15(vec![16384, 8192]));
        assert_eq!(b.launches(), 1);
    }

    #[test]
    fn reset_poisons_until_next_launch() {
        let mut b = ReferenceBackend::new();
        let signal = EncodedSignal::encode(&[0.5, 0.5], SampleEncoding::Q15);
        b.load(&signal).unwrap();
        b.reset_output().unwrap();
        assert_eq!(b.read_output().unwrap(), AcorrOutput::poisoned(SampleEncoding::Q15, 2));

        let g = KernelVariant::Naive.geometry(2, 1, SampleEncoding::Q15).unwrap();
        b.launch(KernelVariant::Naive, &g).unwrap();
        assert_eq!(b.read_output().unwrap(), AcorrOutput::Q15(vec![16384, 8192]));
    }
}
