// Columnar export of a fill trace as an Arrow IPC file.
use std::sync::Arc;

use arrow::array::{ArrayRef, PrimitiveArray, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema, UInt32Type, UInt8Type};
use arrow::error::Result as ArrowResult;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::error::Result;
use crate::step::Step;

const IPC_ARROW_BATCH_SIZE: usize = 1 << 12;

pub const STEP_KIND_INIT: u8 = 0;
pub const STEP_KIND_CALCULATION: u8 = 1;

pub fn trace_schema() -> Schema {
    Schema::new(vec![
        Field::new("kind", DataType::UInt8, false),
        Field::new("i", DataType::UInt32, false),
        Field::new("j", DataType::UInt32, false),
        Field::new("value", DataType::UInt32, false),
        Field::new("cost", DataType::UInt8, true),
        Field::new("deletion", DataType::UInt32, true),
        Field::new("insertion", DataType::UInt32, true),
        Field::new("substitution", DataType::UInt32, true),
        Field::new("char1", DataType::Utf8, true),
        Field::new("char2", DataType::Utf8, true),
    ])
}

struct TraceBatch {
    kind: Vec<u8>,
    i: Vec<u32>,
    j: Vec<u32>,
    value: Vec<u32>,
    cost: Vec<Option<u8>>,
    deletion: Vec<Option<u32>>,
    insertion: Vec<Option<u32>>,
    substitution: Vec<Option<u32>>,
    char1: StringBuilder,
    char2: StringBuilder,
}

impl TraceBatch {
    fn new() -> Self {
        TraceBatch {
            kind: Vec::with_capacity(IPC_ARROW_BATCH_SIZE),
            i: Vec::with_capacity(IPC_ARROW_BATCH_SIZE),
            j: Vec::with_capacity(IPC_ARROW_BATCH_SIZE),
            value: Vec::with_capacity(IPC_ARROW_BATCH_SIZE),
            cost: Vec::with_capacity(IPC_ARROW_BATCH_SIZE),
            deletion: Vec::with_capacity(IPC_ARROW_BATCH_SIZE),
            insertion: Vec::with_capacity(IPC_ARROW_BATCH_SIZE),
            substitution: Vec::with_capacity(IPC_ARROW_BATCH_SIZE),
            char1: StringBuilder::with_capacity(IPC_ARROW_BATCH_SIZE, IPC_ARROW_BATCH_SIZE * 4),
            char2: StringBuilder::with_capacity(IPC_ARROW_BATCH_SIZE, IPC_ARROW_BATCH_SIZE * 4),
        }
    }

    fn add(&mut self, step: &Step) {
        let (i, j) = step.cell();
        self.i.push(i as u32);
        self.j.push(j as u32);
        self.value.push(step.value());
        match step {
            Step::Init { .. } => {
                self.kind.push(STEP_KIND_INIT);
                self.cost.push(None);
                self.deletion.push(None);
                self.insertion.push(None);
                self.substitution.push(None);
                self.char1.append_null();
                self.char2.append_null();
            }
            Step::Calculation {
                cost,
                deletion,
                insertion,
                substitution,
                char1,
                char2,
                ..
            } => {
                self.kind.push(STEP_KIND_CALCULATION);
                self.cost.push(Some(*cost as u8));
                self.deletion.push(Some(*deletion));
                self.insertion.push(Some(*insertion));
                self.substitution.push(Some(*substitution));
                self.char1.append_value(char1);
                self.char2.append_value(char2);
            }
        }
    }

    fn is_full(&self) -> bool {
        self.kind.len() >= IPC_ARROW_BATCH_SIZE
    }

    fn len(&self) -> usize {
        self.kind.len()
    }

    fn write_and_clear(&mut self, writer: &mut FileWriter<Vec<u8>>, schema: &Arc<Schema>) -> ArrowResult<()> {
        if self.len() == 0 {
            return Ok(());
        }
        let columns: Vec<ArrayRef> = vec![
            Arc::new(PrimitiveArray::<UInt8Type>::from(std::mem::take(&mut self.kind))),
            Arc::new(PrimitiveArray::<UInt32Type>::from(std::mem::take(&mut self.i))),
            Arc::new(PrimitiveArray::<UInt32Type>::from(std::mem::take(&mut self.j))),
            Arc::new(PrimitiveArray::<UInt32Type>::from(std::mem::take(&mut self.value))),
            Arc::new(PrimitiveArray::<UInt8Type>::from(std::mem::take(&mut self.cost))),
            Arc::new(PrimitiveArray::<UInt32Type>::from(std::mem::take(&mut self.deletion))),
            Arc::new(PrimitiveArray::<UInt32Type>::from(std::mem::take(&mut self.insertion))),
            Arc::new(PrimitiveArray::<UInt32Type>::from(std::mem::take(&mut self.substitution))),
            Arc::new(self.char1.finish()),
            Arc::new(self.char2.finish()),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns)?;
        writer.write(&batch)?;
        Ok(())
    }
}

/// One row per step, in trace order. Boundary rows leave the calculation
/// columns null.
pub fn trace_to_ipc_bytes(steps: &[Step]) -> Result<Vec<u8>> {
    let schema = Arc::new(trace_schema());
    let mut writer = FileWriter::try_new(Vec::new(), &schema)?;
    let mut batch = TraceBatch::new();
    let mut batches = 0usize;

    for step in steps {
        batch.add(step);
        if batch.is_full() {
            batch.write_and_clear(&mut writer, &schema)?;
            batches += 1;
        }
    }
    if batch.len() > 0 {
        batch.write_and_clear(&mut writer, &schema)?;
        batches += 1;
    }

    let bytes = writer.into_inner()?;
    debug!(
        "exported {} steps in {} batches ({} bytes)",
        steps.len(),
        batches,
        bytes.len()
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levenshtein::{compute, compute_with, EngineOptions};
    use arrow::array::{Array, StringArray, UInt32Array, UInt8Array};
    use arrow::ipc::reader::FileReader;
    use std::io::Cursor;

    fn read_back(bytes: Vec<u8>) -> Vec<RecordBatch> {
        FileReader::try_new(Cursor::new(bytes), None)
            .unwrap()
            .collect::<ArrowResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn one_row_per_step() {
        let computation = compute("kitten", "sitting").unwrap();
        let batches = read_back(trace_to_ipc_bytes(computation.steps()).unwrap());
        let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
        assert_eq!(rows, computation.steps().len());
        let names: Vec<String> = batches[0]
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names[0], "kind");
        assert_eq!(names.len(), trace_schema().fields().len());
    }

    #[test]
    fn columns_carry_step_fields() {
        let computation = compute("a", "b").unwrap();
        let batches = read_back(trace_to_ipc_bytes(computation.steps()).unwrap());
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];

        let kind = batch.column(0).as_any().downcast_ref::<UInt8Array>().unwrap();
        assert_eq!(kind.values().to_vec(), vec![0, 0, 0, 0, 1]);

        let value = batch.column(3).as_any().downcast_ref::<UInt32Array>().unwrap();
        assert_eq!(value.value(4), 1);

        let cost = batch.column(4).as_any().downcast_ref::<UInt8Array>().unwrap();
        assert!(cost.is_null(0));
        assert_eq!(cost.value(4), 1);

        let char1 = batch.column(8).as_any().downcast_ref::<StringArray>().unwrap();
        let char2 = batch.column(9).as_any().downcast_ref::<StringArray>().unwrap();
        assert!(char1.is_null(3));
        assert_eq!((char1.value(4), char2.value(4)), ("a", "b"));
    }

    #[test]
    fn large_trace_spans_several_batches() {
        let options = EngineOptions {
            max_input_units: None,
            ..EngineOptions::default()
        };
        let s1 = "ab".repeat(40);
        let s2 = "ba".repeat(40);
        let computation = compute_with(&s1, &s2, &options).unwrap();
        assert!(computation.steps().len() > IPC_ARROW_BATCH_SIZE);

        let batches = read_back(trace_to_ipc_bytes(computation.steps()).unwrap());
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].num_rows(), IPC_ARROW_BATCH_SIZE);
        let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
        assert_eq!(rows, computation.steps().len());
    }

    #[test]
    fn empty_trace_writes_schema_only() {
        let batches = read_back(trace_to_ipc_bytes(&[]).unwrap());
        assert!(batches.is_empty());
    }
}
