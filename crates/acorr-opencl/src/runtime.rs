//! The OpenCL backend: one context, one in-order command queue.

use std::collections::HashMap;

use acorr_harness::AcorrBackend;
use acorr_kernels::{
    AcorrOutput, EncodedSignal, KernelSourceSet, KernelVariant, LaunchGeometry,
    Q15_OUTPUT_SENTINEL, SampleEncoding, kernel_name,
};
use opencl3::command_queue::CommandQueue;
use opencl3::context::Context;
use opencl3::device::Device;
use opencl3::error_codes::CL_INVALID_BUFFER_SIZE;
use opencl3::kernel::{ExecuteKernel, Kernel};
use opencl3::memory::{CL_MEM_READ_ONLY, CL_MEM_WRITE_ONLY};
use opencl3::program::Program;
use opencl3::types::{cl_int, cl_mem};
use tracing::{debug, info};

use crate::buffer::DeviceBuffer;
use crate::device::{DeviceInfo, DeviceKind, discover, select_device};
use crate::error::{OpenClError, Result};

/// Input and output buffers for the loaded encoding.
#[derive(Debug)]
enum SignalBuffers {
    F32 { input: DeviceBuffer<f32>, output: DeviceBuffer<f32> },
    Q15 { input: DeviceBuffer<i16>, output: DeviceBuffer<i32> },
    F16 { input: DeviceBuffer<u16>, output: DeviceBuffer<f32> },
}

impl SignalBuffers {
    fn upload(context: &Context, queue: &CommandQueue, signal: &EncodedSignal) -> Result<Self> {
        let n = signal.len();
        Ok(match signal {
            EncodedSignal::F32(x) => {
                let mut input = DeviceBuffer::new(context, CL_MEM_READ_ONLY, n)?;
                input.write(queue, x)?;
                Self::F32 { input, output: DeviceBuffer::new(context, CL_MEM_WRITE_ONLY, n)? }
            }
            EncodedSignal::Q15(x) => {
                let mut input = DeviceBuffer::new(context, CL_MEM_READ_ONLY, n)?;
                input.write(queue, x)?;
                Self::Q15 { input, output: DeviceBuffer::new(context, CL_MEM_WRITE_ONLY, n)? }
            }
            EncodedSignal::F16(x) => {
                let mut input = DeviceBuffer::new(context, CL_MEM_READ_ONLY, n)?;
                input.write(queue, x)?;
                Self::F16 { input, output: DeviceBuffer::new(context, CL_MEM_WRITE_ONLY, n)? }
            }
        })
    }

    fn input_mem(&self) -> cl_mem {
        match self {
            Self::F32 { input, .. } => input.mem(),
            Self::Q15 { input, .. } => input.mem(),
            Self::F16 { input, .. } => input.mem(),
        }
    }

    fn output_mem(&self) -> cl_mem {
        match self {
            Self::F32 { output, .. } | Self::F16 { output, .. } => output.mem(),
            Self::Q15 { output, .. } => output.mem(),
        }
    }

    fn poison(&mut self, queue: &CommandQueue) -> Result<()> {
        match self {
            Self::F32 { output, .. } | Self::F16 { output, .. } => output.fill(queue, f32::NAN),
            Self::Q15 { output, .. } => output.fill(queue, Q15_OUTPUT_SENTINEL),
        }
    }

    fn download(&self, queue: &CommandQueue) -> Result<AcorrOutput> {
        Ok(match self {
            Self::F32 { output, .. } | Self::F16 { output, .. } => {
                AcorrOutput::F32(output.read_to_vec(queue)?)
            }
            Self::Q15 { output, .. } => AcorrOutput::Q15(output.read_to_vec(queue)?),
        })
    }
}

/// Program, kernels and buffers for one encoding.
struct Loaded {
    encoding: SampleEncoding,
    n: cl_int,
    kernels: HashMap<KernelVariant, Kernel>,
    buffers: SignalBuffers,
    _program: Program,
}

/// OpenCL implementation of [`AcorrBackend`].
pub struct OpenClBackend {
    info: DeviceInfo,
    sources: KernelSourceSet,
    loaded: Option<Loaded>,
    queue: CommandQueue,
    context: Context,
}

impl std::fmt::Debug for OpenClBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenClBackend")
            .field("device", &self.info.name)
            .field("platform", &self.info.platform)
            .field("loaded", &self.loaded.as_ref().map(|l| l.encoding))
            .finish()
    }
}

impl OpenClBackend {
    /// Create a context and command queue on the device at `index`.
    pub fn new(index: usize, kind: DeviceKind, sources: KernelSourceSet) -> Result<Self> {
        let found = discover(kind)?;
        let infos: Vec<DeviceInfo> = found.iter().map(|(info, _)| info.clone()).collect();
        let info = select_device(&infos, index)?.clone();
        let device = Device::new(found[index].1);

        let context = Context::from_device(&device)
            .map_err(|e| OpenClError::cl(e.0, "create context"))?;
        let queue = CommandQueue::create_default_with_properties(&context, 0, 0)
            .map_err(|e| OpenClError::cl(e.0, "create command queue"))?;

        info!(device = %info.name, platform = %info.platform, "Using OpenCL device");
        Ok(Self { info, sources, loaded: None, queue, context })
    }

    /// The selected device.
    pub fn device(&self) -> &DeviceInfo {
        &self.info
    }

    fn build(&self, encoding: SampleEncoding) -> Result<(Program, HashMap<KernelVariant, Kernel>)> {
        let source = self.sources.source(encoding);
        let program = Program::create_and_build_from_source(&self.context, source, "")
            .map_err(|log| OpenClError::Build { encoding, log })?;
        debug!(%encoding, "program built");

        let mut kernels = HashMap::with_capacity(KernelVariant::ALL.len());
        for &variant in KernelVariant::ALL {
            let name = kernel_name(variant, encoding);
            let kernel = Kernel::create(&program, name)
                .map_err(|e| OpenClError::cl(e.0, format!("create kernel {name}")))?;
            kernels.insert(variant, kernel);
        }
        Ok((program, kernels))
    }
}

impl AcorrBackend for OpenClBackend {
    type Error = OpenClError;

    fn name(&self) -> &'static str {
        "opencl"
    }

    fn device_name(&self) -> &str {
        &self.info.name
    }

    fn max_work_group_size(&self) -> usize {
        self.info.max_work_group_size
    }

    fn load(&mut self, signal: &EncodedSignal) -> Result<()> {
        let encoding = signal.encoding();
        let n = cl_int::try_from(signal.len())
            .map_err(|_| {
                OpenClError::cl(CL_INVALID_BUFFER_SIZE, format!("{} samples", signal.len()))
            })?;

        // Release the previous encoding's buffers before allocating new ones.
        self.loaded = None;
        let (program, kernels) = self.build(encoding)?;
        let buffers = SignalBuffers::upload(&self.context, &self.queue, signal)?;
        debug!(%encoding, bytes = signal.byte_len(), "signal uploaded");

        self.loaded = Some(Loaded { encoding, n, kernels, buffers, _program: program });
        Ok(())
    }

    fn reset_output(&mut self) -> Result<()> {
        let loaded = self.loaded.as_mut().ok_or(OpenClError::NotLoaded)?;
        loaded.buffers.poison(&self.queue)
    }

    fn launch(&mut self, variant: KernelVariant, geometry: &LaunchGeometry) -> Result<()> {
        let loaded = self.loaded.as_ref().ok_or(OpenClError::NotLoaded)?;
        let name = kernel_name(variant, loaded.encoding);
        let kernel = loaded.kernels.get(&variant).ok_or(OpenClError::MissingKernel(name))?;
        let input = loaded.buffers.input_mem();
        let output = loaded.buffers.output_mem();

        let mut exec = ExecuteKernel::new(kernel);
        unsafe {
            exec.set_arg(&loaded.n).set_arg(&input).set_arg(&output);
            if variant.uses_local_memory() {
                exec.set_arg_local_buffer(geometry.local_mem_bytes);
            }
            exec.set_global_work_size(geometry.global_work_size);
            if let Some(local) = geometry.local_work_size {
                exec.set_local_work_size(local);
            }
            exec.enqueue_nd_range(&self.queue)
                .map_err(|e| OpenClError::cl(e.0, format!("enqueue {name}")))?;
        }
        self.queue.finish().map_err(|e| OpenClError::cl(e.0, format!("finish {name}")))
    }

    fn read_output(&mut self) -> Result<AcorrOutput> {
        let loaded = self.loaded.as_ref().ok_or(OpenClError::NotLoaded)?;
        loaded.buffers.download(&self.queue)
    }
}
