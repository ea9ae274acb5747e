//! Diagnostic walk over every report, field and usage a device declares.

use std::fmt;

use crate::backend::HidBackend;
use crate::error::Result;
use crate::usage::{
    FieldInfo, REPORT_ID_FIRST, REPORT_ID_NEXT, ReportInfo, ReportType, UsageLocation, UsageRef,
    page_name,
};

/// One field with all its usages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDump {
    pub info: FieldInfo,
    pub usages: Vec<UsageRef>,
}

/// One report with all its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDump {
    pub info: ReportInfo,
    pub fields: Vec<FieldDump>,
}

/// Enumerate the reports of `report_type` from first to last.
///
/// # Errors
/// Propagates the first rejected query.
pub fn dump_reports<D: HidBackend>(device: &D, report_type: ReportType) -> Result<Vec<ReportDump>> {
    let mut reports = Vec::new();
    let mut cursor = REPORT_ID_FIRST;

    while let Some(info) = device.report_info(report_type, cursor)? {
        let fields = (0..info.num_fields)
            .map(|field_index| dump_field(device, report_type, info.report_id, field_index))
            .collect::<Result<Vec<_>>>()?;
        reports.push(ReportDump { info, fields });
        cursor = info.report_id | REPORT_ID_NEXT;
    }

    Ok(reports)
}

fn dump_field<D: HidBackend>(
    device: &D,
    report_type: ReportType,
    report_id: u32,
    field_index: u32,
) -> Result<FieldDump> {
    let info = device.field_info(report_type, report_id, field_index)?;
    let usages = (0..info.maxusage)
        .map(|usage_index| {
            let location = UsageLocation { report_id, field_index, usage_index };
            device.usage_at(report_type, &location).map_err(Into::into)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(FieldDump { info, usages })
}

impl fmt::Display for ReportDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "report_id=0x{:X} ({} fields)", self.info.report_id, self.info.num_fields)?;
        for field in &self.fields {
            let i = &field.info;
            writeln!(f, "  field_index={} maxusage={} flags=0x{:X}", i.field_index, i.maxusage, i.flags)?;
            writeln!(
                f,
                "    physical=0x{:X} logical=0x{:X} application=0x{:X} reportid=0x{:X}",
                i.physical, i.logical, i.application, i.report_id
            )?;
            writeln!(
                f,
                "    logical_minimum={},maximum={} physical_minimum={},maximum={}",
                i.logical_range.logical_minimum,
                i.logical_range.logical_maximum,
                i.physical_range.logical_minimum,
                i.physical_range.logical_maximum
            )?;
            writeln!(f, "    unit_exponent={} unit=0x{:X}", i.unit_exponent, i.unit)?;
            for usage in &field.usages {
                writeln!(
                    f,
                    "    >> usage_index={} usage_code=0x{:X} ({}) value={}",
                    usage.location.usage_index,
                    usage.usage_code,
                    page_name(usage.usage_code),
                    usage.value
                )?;
            }
        }
        Ok(())
    }
}
