//! Host serial port enumeration and listing output.

use std::io::Write;

use serialport::{SerialPortInfo, SerialPortType};

use crate::error::{MonitorError, Result};
use crate::style;

/// One enumerated device, as shown in the listing. Snapshot of what the OS
/// reported at enumeration time.
#[derive(Clone, Debug, PartialEq)]
pub struct PortDescriptor {
    pub path: String,
    pub description: String,
    pub hardware_id: String,
}

impl From<SerialPortInfo> for PortDescriptor {
    fn from(info: SerialPortInfo) -> PortDescriptor {
        let (description, hardware_id) = match info.port_type {
            SerialPortType::UsbPort(usb) => {
                let description = usb.product.unwrap_or_else(|| "USB Serial".to_string());
                let mut hardware_id = format!("USB VID:PID={:04X}:{:04X}", usb.vid, usb.pid);
                if let Some(serial) = usb.serial_number {
                    hardware_id.push_str(" SER=");
                    hardware_id.push_str(&serial);
                }
                (description, hardware_id)
            }
            SerialPortType::PciPort => ("PCI Serial".to_string(), "PCI".to_string()),
            SerialPortType::BluetoothPort => {
                ("Bluetooth Serial".to_string(), "Bluetooth".to_string())
            }
            SerialPortType::Unknown => ("n/a".to_string(), "n/a".to_string()),
        };
        PortDescriptor {
            path: info.port_name,
            description,
            hardware_id,
        }
    }
}

/// Asks the OS for every serial device it knows about. An empty listing is a
/// perfectly valid answer, not an error.
pub fn list_ports() -> Result<Vec<PortDescriptor>> {
    let ports = serialport::available_ports().map_err(MonitorError::Enumerate)?;
    Ok(ports.into_iter().map(PortDescriptor::from).collect())
}

/// Numbered listing in the shape users pick from: 1-based index, device path,
/// then description and hardware id on their own lines.
pub fn print_ports<W: Write>(out: &mut W, ports: &[PortDescriptor]) -> std::io::Result<()> {
    writeln!(out, "{}{}", style::GREEN, style::rule())?;
    writeln!(out, "  Available Serial Ports:")?;
    writeln!(out, "{}{}", style::rule(), style::RESET)?;
    writeln!(out)?;
    for (i, port) in ports.iter().enumerate() {
        writeln!(
            out,
            "{}{}.{} {}{}{}",
            style::BOLD,
            i + 1,
            style::RESET,
            style::CYAN,
            port.path,
            style::RESET
        )?;
        writeln!(out, "   Description: {}", port.description)?;
        writeln!(out, "   Hardware ID: {}", port.hardware_id)?;
        writeln!(out)?;
    }
    writeln!(out, "{}{}{}", style::GREEN, style::rule(), style::RESET)
}

pub fn print_no_ports_help<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}✗ No serial ports found!{}", style::RED, style::RESET)?;
    writeln!(out)?;
    writeln!(out, "Troubleshooting:")?;
    writeln!(out, "  1. Check if device is connected")?;
    writeln!(out, "  2. Install/update USB drivers (CP210x, CH340, FTDI)")?;
    writeln!(out, "  3. Try a different USB port or cable")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    fn usb_info(product: Option<&str>, serial: Option<&str>) -> SerialPortInfo {
        SerialPortInfo {
            port_name: "/dev/ttyUSB0".to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x10C4,
                pid: 0xEA60,
                serial_number: serial.map(str::to_string),
                manufacturer: Some("Silicon Labs".to_string()),
                product: product.map(str::to_string),
            }),
        }
    }

    #[test]
    fn usb_descriptor_uses_product_and_formats_ids() {
        let descriptor = PortDescriptor::from(usb_info(Some("CP2102 USB to UART"), Some("0001")));
        assert_eq!(descriptor.path, "/dev/ttyUSB0");
        assert_eq!(descriptor.description, "CP2102 USB to UART");
        assert_eq!(descriptor.hardware_id, "USB VID:PID=10C4:EA60 SER=0001");
    }

    #[test]
    fn usb_descriptor_without_metadata_gets_fallbacks() {
        let descriptor = PortDescriptor::from(usb_info(None, None));
        assert_eq!(descriptor.description, "USB Serial");
        assert_eq!(descriptor.hardware_id, "USB VID:PID=10C4:EA60");
    }

    #[test]
    fn unknown_port_type_is_reported_as_na() {
        let descriptor = PortDescriptor::from(SerialPortInfo {
            port_name: "COM3".to_string(),
            port_type: SerialPortType::Unknown,
        });
        assert_eq!(descriptor.description, "n/a");
        assert_eq!(descriptor.hardware_id, "n/a");
    }

    #[test]
    fn listing_is_one_based_and_shows_every_field() {
        let ports = vec![
            PortDescriptor {
                path: "COM3".to_string(),
                description: "USB Serial".to_string(),
                hardware_id: "USB VID:PID=1A86:7523".to_string(),
            },
            PortDescriptor {
                path: "COM7".to_string(),
                description: "n/a".to_string(),
                hardware_id: "n/a".to_string(),
            },
        ];
        let mut out = Vec::new();
        print_ports(&mut out, &ports).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("1."), "got: {text}");
        assert!(text.contains("COM3"));
        assert!(text.contains("2."));
        assert!(text.contains("COM7"));
        assert!(text.contains("Description: USB Serial"));
        assert!(text.contains("Hardware ID: USB VID:PID=1A86:7523"));
    }

    #[test]
    fn no_ports_help_names_the_usual_drivers() {
        let mut out = Vec::new();
        print_no_ports_help(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No serial ports found"));
        assert!(text.contains("CP210x"));
        assert!(text.contains("CH340"));
    }
}
