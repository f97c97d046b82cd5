// src/controllers/osc.rs
// OSC command surface. External form logic drives the signature pad
// over these addresses:
//
//   /signature/name     s        card holder name
//   /signature/mode     s        "auto" | "manual"
//   /signature/generate          re-render the synthetic signature
//   /signature/clear             wipe the pad
//   /signature/export   s        "png" | "pdf"

use nannou_osc as osc;
use std::error::Error;

use crate::models::signature_model::SignatureMode;
use crate::services::export_service::ExportFormat;

#[derive(Debug)]
pub enum SignatureCommand {
    SetName { name: String },
    SetMode { mode: SignatureMode },
    Generate,
    Clear,
    Export { format: ExportFormat },
}

pub struct OscController {
    command_queue: Vec<SignatureCommand>,
    receiver: osc::Receiver,
}

impl OscController {
    pub fn new(port: u16) -> Result<Self, Box<dyn Error>> {
        let receiver = osc::receiver(port)?;

        Ok(Self {
            command_queue: Vec::new(),
            receiver,
        })
    }

    pub fn process_messages(&mut self) {
        for (packet, _addr) in self.receiver.try_iter() {
            for message in packet.into_msgs() {
                match message.addr.as_str() {
                    "/signature/name" => {
                        if let [osc::Type::String(name)] = &message.args[..] {
                            self.command_queue
                                .push(SignatureCommand::SetName { name: name.clone() });
                        }
                    }
                    "/signature/mode" => {
                        if let [osc::Type::String(mode)] = &message.args[..] {
                            match mode.parse::<SignatureMode>() {
                                Ok(mode) => {
                                    self.command_queue.push(SignatureCommand::SetMode { mode })
                                }
                                Err(err) => eprintln!("/signature/mode: {}", err),
                            }
                        }
                    }
                    "/signature/generate" => {
                        self.command_queue.push(SignatureCommand::Generate);
                    }
                    "/signature/clear" => {
                        self.command_queue.push(SignatureCommand::Clear);
                    }
                    "/signature/export" => {
                        if let [osc::Type::String(format)] = &message.args[..] {
                            match ExportFormat::parse(format) {
                                Some(format) => {
                                    self.command_queue.push(SignatureCommand::Export { format })
                                }
                                None => {
                                    eprintln!("/signature/export: unknown format {:?}", format)
                                }
                            }
                        }
                    }
                    _ => (),
                }
            }
        }
    }

    pub fn take_commands(&mut self) -> Vec<SignatureCommand> {
        std::mem::take(&mut self.command_queue)
    }
}
