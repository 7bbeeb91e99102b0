//! How much of a trace's structure the loop compressor captured.
//!
//! Brotli at quality 2 serves as a general-purpose baseline: a loop program
//! shorter than brotli's encoding of the same trace found structure brotli
//! could not exploit.

/// Sizes of one trace and its two encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceStats {
    pub trace_len: usize,
    /// Length of the loop program sent instead of the trace.
    pub program_len: usize,
    /// Length of the trace after brotli compression.
    pub brotli_len: usize,
}

impl TraceStats {
    pub fn measure(trace: &str, program: &str) -> Self {
        Self {
            trace_len: trace.len(),
            program_len: program.len(),
            brotli_len: brotli_len(trace.as_bytes()),
        }
    }

    /// Program length relative to the trace.
    pub fn loop_ratio(&self) -> f64 {
        ratio(self.program_len, self.trace_len)
    }

    /// Brotli length relative to the trace. Short traces exceed 1.0 because
    /// of the framing overhead.
    pub fn brotli_ratio(&self) -> f64 {
        ratio(self.brotli_len, self.trace_len)
    }

    /// Positive when the loop program beats brotli.
    pub fn loop_advantage(&self) -> f64 {
        self.brotli_ratio() - self.loop_ratio()
    }
}

fn ratio(len: usize, trace_len: usize) -> f64 {
    if trace_len == 0 {
        return 1.0;
    }
    len as f64 / trace_len as f64
}

/// Brotli-compressed size of `data`, or its raw size if the encoder fails.
fn brotli_len(data: &[u8]) -> usize {
    if data.is_empty() {
        return 0;
    }
    let mut compressed = Vec::new();
    let params = brotli::enc::BrotliEncoderParams {
        quality: 2,
        ..Default::default()
    };
    match brotli::BrotliCompress(&mut &data[..], &mut compressed, &params) {
        Ok(_) => compressed.len(),
        Err(_) => data.len(),
    }
}
