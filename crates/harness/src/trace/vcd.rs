//! Value Change Dump (IEEE 1364) writer.
//!
//! Variables are declared under a single `top` scope when the first dump is written. The set is
//! the signal table's names plus every signal the DUT reports at that point, so inputs the
//! harness drives only later, such as the UART send lanes, are still traced. Each dump emits a
//! timestamp followed by the variables whose value changed.

use std::collections::BTreeMap;
use std::io::{self, Write};

use vcd_ng::{IdCode, TimescaleUnit, Value, VecValue, Writer};

use crate::dut::signals::default_width;
use crate::dut::{Dut, SignalSample};
use crate::trace::WaveformSink;

/// Scope holding every variable.
const SCOPE: &str = "top";

struct Var {
    name: String,
    id: IdCode,
    width: u32,
    last: Option<u64>,
}

const fn mask(width: u32) -> u64 {
    if width >= 64 { u64::MAX } else { (1 << width) - 1 }
}

const fn bit(value: u64, index: u32) -> Value {
    if (value >> index) & 1 == 1 { Value::V1 } else { Value::V0 }
}

/// VCD writer over any output. The output is released (and a buffered one flushed) by
/// [`WaveformSink::finish`].
pub struct VcdWriter<W: Write> {
    writer: Option<Writer<W>>,
    declared: Vec<String>,
    vars: Vec<Var>,
    header_written: bool,
}

impl<W: Write> std::fmt::Debug for VcdWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VcdWriter")
            .field("declared", &self.declared.len())
            .field("vars", &self.vars.len())
            .field("open", &self.writer.is_some())
            .finish()
    }
}

impl<W: Write> VcdWriter<W> {
    /// Wraps `out`. `declared` names signals to trace even if the DUT does not report them
    /// at the first dump; the header is written by that dump.
    pub fn new<I, S>(out: W, declared: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            writer: Some(Writer::new(out)),
            declared: declared.into_iter().map(Into::into).collect(),
            vars: Vec::new(),
            header_written: false,
        }
    }

    fn declare(writer: &mut Writer<W>, declared: &[String], dut: &dyn Dut) -> io::Result<Vec<Var>> {
        let mut widths: BTreeMap<String, u32> = declared
            .iter()
            .map(|name| (name.clone(), default_width(name)))
            .collect();
        dut.for_each_signal(&mut |s: SignalSample<'_>| {
            let _ = widths.insert(s.name.to_string(), s.width);
        });

        writer.timescale(1, TimescaleUnit::NS)?;
        writer.add_module(SCOPE)?;
        let mut vars = Vec::with_capacity(widths.len());
        for (name, width) in widths {
            let width = width.clamp(1, 64);
            let id = writer.add_wire(width, &name)?;
            vars.push(Var {
                name,
                id,
                width,
                last: None,
            });
        }
        writer.upscope()?;
        writer.enddefinitions()?;
        tracing::debug!(vars = vars.len(), "vcd header written");
        Ok(vars)
    }
}

impl<W: Write> WaveformSink for VcdWriter<W> {
    fn dump(&mut self, timestamp: u64, dut: &dyn Dut) -> io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("VCD output already finished"))?;
        if !self.header_written {
            self.vars = Self::declare(writer, &self.declared, dut)?;
            self.header_written = true;
        }

        writer.timestamp(timestamp)?;
        for var in &mut self.vars {
            let value = dut.get_signal(&var.name) & mask(var.width);
            if var.last == Some(value) {
                continue;
            }
            var.last = Some(value);
            if var.width == 1 {
                writer.change_scalar(var.id, bit(value, 0))?;
            } else {
                let bits: Vec<Value> = (0..var.width).rev().map(|i| bit(value, i)).collect();
                writer.change_vector(var.id, &VecValue::from(bits))?;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer = None;
        Ok(())
    }
}
