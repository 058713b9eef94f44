use crate::annotations::defect_outline::{Candidate, DefectOutline};
use crate::error::StitchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// A merged detection with its final identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Defect {
    pub id: usize,
    pub confidence: f32,
    pub outline: DefectOutline,
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Defect {{ id: {}, tile: {}, confidence: {:.3}, {}, polygon points: {} }}",
            self.id,
            self.outline.tile_index,
            self.confidence,
            self.outline.bounding_box,
            self.outline.polygon.len()
        )
    }
}

/// One entry of the JSON report.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DefectRecord {
    pub id: usize,
    pub tile_index: u32,
    pub bbox: [i32; 4],
    pub polygon: Vec<[i32; 2]>,
}

impl From<&Defect> for DefectRecord {
    fn from(defect: &Defect) -> Self {
        DefectRecord {
            id: defect.id,
            tile_index: defect.outline.tile_index,
            bbox: defect.outline.bounding_box.as_xywh(),
            polygon: defect.outline.polygon.iter().copied().map(Into::into).collect(),
        }
    }
}

/// Numbers merge survivors 0..N-1 in the order they survived. Nothing is filtered here.
pub fn assemble_defects(survivors: Vec<Candidate>) -> Vec<Defect> {
    survivors
        .into_iter()
        .enumerate()
        .map(|(id, survivor)| Defect {
            id,
            confidence: survivor.confidence,
            outline: survivor.annotation,
        })
        .collect()
}

pub fn to_records(defects: &[Defect]) -> Vec<DefectRecord> {
    defects.iter().map(DefectRecord::from).collect()
}

/// Writes the report as a pretty printed JSON array followed by a newline.
pub fn write_report<W: Write>(defects: &[Defect], mut writer: W) -> Result<(), StitchError> {
    serde_json::to_writer_pretty(&mut writer, &to_records(defects))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::BoundingBox;
    use crate::annotations::detection::Detection;
    use crate::annotations::point::Point;
    use serde_json::json;

    fn survivor(x: i32, confidence: f32, tile_index: u32) -> Candidate {
        Detection {
            annotation: DefectOutline::new(
                BoundingBox::new(x, 4, 10, 12).unwrap(),
                vec![Point::new(x, 4), Point::new(x + 3, 9)],
                tile_index,
            ),
            confidence,
        }
    }

    #[test]
    fn ids_follow_survivor_order() {
        let defects = assemble_defects(vec![
            survivor(700, 0.9, 2),
            survivor(10, 0.8, 0),
            survivor(400, 0.3, 1),
        ]);
        let ids: Vec<usize> = defects.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(defects[0].outline.tile_index, 2);
        assert_eq!(defects[1].outline.bounding_box.as_xywh(), [10, 4, 10, 12]);
        assert_eq!(defects[2].confidence, 0.3);
    }

    #[test]
    fn report_format() {
        let defects = assemble_defects(vec![survivor(330, 0.7, 1)]);
        let mut buffer = Vec::new();
        write_report(&defects, &mut buffer).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(
            value,
            json!([{
                "id": 0,
                "tile_index": 1,
                "bbox": [330, 4, 10, 12],
                "polygon": [[330, 4], [333, 9]]
            }])
        );
        assert!(buffer.ends_with(b"\n"));
    }

    #[test]
    fn empty_report_is_empty_array() {
        let mut buffer = Vec::new();
        write_report(&[], &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "[]\n");
    }

    #[test]
    fn empty_polygon_serialises_as_empty_array() {
        let mut no_outline = survivor(0, 0.5, 0);
        no_outline.annotation.polygon.clear();
        let records = to_records(&assemble_defects(vec![no_outline]));
        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([{"id": 0, "tile_index": 0, "bbox": [0, 4, 10, 12], "polygon": []}])
        );
    }
}
