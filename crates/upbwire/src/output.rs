use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use upbwire_message::{
    command_name, DeviceStateReport, GotoPayload, Message, NameBlock, RegisterValuesReport,
    Transmission,
};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Typed payload view attached to decoded messages the CLI understands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayloadDetail {
    Level {
        level: u8,
        rate: Option<u8>,
        channel: Option<u8>,
    },
    DeviceState {
        levels: Vec<u8>,
    },
    Registers {
        start_register: u8,
        values: String,
        name: Option<String>,
    },
}

impl PayloadDetail {
    pub fn from_goto(payload: &GotoPayload) -> Self {
        PayloadDetail::Level {
            level: payload.level,
            rate: payload.rate,
            channel: payload.channel_index(),
        }
    }

    pub fn from_device_state(report: &DeviceStateReport) -> Self {
        PayloadDetail::DeviceState {
            levels: report.levels().to_vec(),
        }
    }

    pub fn from_registers(report: &RegisterValuesReport) -> Self {
        PayloadDetail::Registers {
            start_register: report.start_register,
            values: hex::encode_upper(report.values),
            name: report.name().map(|(block, name)| {
                let block = match block {
                    NameBlock::Network => "network",
                    NameBlock::Room => "room",
                    NameBlock::Device => "device",
                };
                format!("{block}: {name}")
            }),
        }
    }

    fn summary(&self) -> String {
        match self {
            PayloadDetail::Level {
                level,
                rate,
                channel,
            } => {
                let rate = rate.map_or_else(|| "default".to_string(), |rate| rate.to_string());
                match channel {
                    Some(channel) => format!("level={level} rate={rate} channel={channel}"),
                    None => format!("level={level} rate={rate}"),
                }
            }
            PayloadDetail::DeviceState { levels } => format!("levels={levels:?}"),
            PayloadDetail::Registers {
                start_register,
                values,
                name,
            } => match name {
                Some(name) => format!("register={start_register} {name}"),
                None => format!("register={start_register} values={values}"),
            },
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    link: bool,
    repeater_req: u8,
    length: u8,
    ack_req: u8,
    tx_count: u8,
    tx_seq: u8,
    network_id: u8,
    dest_id: u8,
    src_id: u8,
    msg_id: u8,
    command: &'a str,
    data: String,
    declared_transmits: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a PayloadDetail>,
}

pub fn print_message(
    message: &Message,
    summary: &Transmission,
    detail: Option<&PayloadDetail>,
    format: OutputFormat,
) {
    let command = command_name(message.msg_id);
    let data = hex::encode_upper(&message.data);

    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                link: message.link,
                repeater_req: message.repeater_req,
                length: message.length,
                ack_req: message.ack_req,
                tx_count: message.tx_count,
                tx_seq: message.tx_seq,
                network_id: message.network_id,
                dest_id: message.dest_id,
                src_id: message.src_id,
                msg_id: message.msg_id,
                command,
                data,
                declared_transmits: summary.tx_count,
                detail,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec![
                    "command".to_string(),
                    format!("{command} (0x{:02X})", message.msg_id),
                ])
                .add_row(vec!["link".to_string(), message.link.to_string()])
                .add_row(vec!["network".to_string(), message.network_id.to_string()])
                .add_row(vec!["dest".to_string(), message.dest_id.to_string()])
                .add_row(vec!["src".to_string(), message.src_id.to_string()])
                .add_row(vec!["length".to_string(), message.length.to_string()])
                .add_row(vec![
                    "repeater_req".to_string(),
                    message.repeater_req.to_string(),
                ])
                .add_row(vec!["ack_req".to_string(), message.ack_req.to_string()])
                .add_row(vec![
                    "transmits".to_string(),
                    format!("{} (seq {})", summary.tx_count, message.tx_seq),
                ])
                .add_row(vec!["data".to_string(), data]);
            if let Some(detail) = detail {
                table.add_row(vec!["payload".to_string(), detail.summary()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let mut line = format!(
                "{command} net={} dest={} src={} link={} transmits={} seq={} data={}",
                message.network_id,
                message.dest_id,
                message.src_id,
                message.link,
                summary.tx_count,
                message.tx_seq,
                data
            );
            if let Some(detail) = detail {
                line.push(' ');
                line.push_str(&detail.summary());
            }
            println!("{line}");
        }
        OutputFormat::Raw => {
            println!("{data}");
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    command: &'a str,
    frame: &'a str,
}

pub fn print_frame(frame: &str, command: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput { command, frame };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "FRAME"])
                .add_row(vec![command, frame]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{command} frame={frame}");
        }
        OutputFormat::Raw => {
            println!("{frame}");
        }
    }
}
