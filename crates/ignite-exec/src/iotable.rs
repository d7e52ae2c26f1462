use ignite_core::io::IoCharacteristicsTable;
use ignite_model::{IoCharacteristics, WellKnownIo};

const fn io(read_iops: u64, read_bandwidth: u64, write_iops: u64, write_bandwidth: u64) -> IoCharacteristics {
    IoCharacteristics {
        read_iops,
        read_bandwidth,
        write_iops,
        write_bandwidth,
    }
}

/// Measured characteristics keyed by vendor, VM type and storage.
const MEASURED: &[(&str, &str, &str, IoCharacteristics)] = &[
    ("aws", "i3.large", "nvme", io(111_000, 653_925_080, 36_800, 215_066_473)),
    ("aws", "i3.xlarge", "nvme", io(200_800, 1_185_106_376, 53_180, 423_621_267)),
    ("aws", "i3.2xlarge", "nvme", io(411_200, 2_015_342_735, 181_500, 808_775_652)),
    ("aws", "i3en.large", "nvme", io(43_315, 330_301_440, 33_177, 165_675_008)),
    ("gcp", "n2-standard-4", "local-ssd", io(170_000, 660_000_000, 90_000, 350_000_000)),
    ("azure", "Standard_L8s_v2", "nvme", io(400_000, 2_000_000_000, 200_000, 1_000_000_000)),
];

/// Conservative characteristics used when only the vendor is known.
const VENDOR_DEFAULTS: &[(&str, IoCharacteristics)] = &[
    ("aws", io(43_315, 330_301_440, 33_177, 165_675_008)),
    ("gcp", io(90_000, 400_000_000, 50_000, 200_000_000)),
    ("azure", io(100_000, 500_000_000, 50_000, 250_000_000)),
];

/// Table compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinIoTable;

impl IoCharacteristicsTable for BuiltinIoTable {
    fn lookup(&self, id: &WellKnownIo) -> Option<IoCharacteristics> {
        MEASURED
            .iter()
            .find(|(vendor, vm, storage, _)| {
                *vendor == id.vendor && *vm == id.vm_type && *storage == id.storage
            })
            .map(|(_, _, _, io)| *io)
    }

    fn vendor_default(&self, vendor: &str) -> Option<IoCharacteristics> {
        VENDOR_DEFAULTS
            .iter()
            .find(|(v, _)| *v == vendor)
            .map(|(_, io)| *io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_lookup() {
        let id: WellKnownIo = "aws:i3.xlarge:nvme".parse().unwrap();
        let io = BuiltinIoTable.lookup(&id).unwrap();
        assert_eq!(io.read_iops, 200_800);

        let missing: WellKnownIo = "aws:i3.xlarge:ebs".parse().unwrap();
        assert!(BuiltinIoTable.lookup(&missing).is_none());
    }

    #[test]
    fn vendor_defaults() {
        assert!(BuiltinIoTable.vendor_default("gcp").is_some());
        assert!(BuiltinIoTable.vendor_default("oracle").is_none());
    }
}
