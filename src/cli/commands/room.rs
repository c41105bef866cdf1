//! Room command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, RoomAction};
use crate::config::Settings;
use crate::input::NewRoom;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the room command.
pub async fn run_room(action: &RoomAction, settings: Settings) -> Result<()> {
    preflight::check(Operation::Browse, &settings)?;
    let orchestrator = Orchestrator::new(settings)?;
    let records = orchestrator.records();

    match action {
        RoomAction::Create { name, description } => {
            let new_room = NewRoom::new(name.as_str(), description.clone())?;
            let room = records.create_room(&new_room).await?;
            Output::success(&format!("Created room '{}'", room.name));
            Output::kv("ID", &room.id.to_string());
        }

        RoomAction::List => {
            let rooms = records.list_rooms().await?;
            if rooms.is_empty() {
                Output::info("No rooms yet. Use 'lectern room create <name>' to add one.");
            } else {
                Output::header(&format!("Rooms ({})", rooms.len()));
                println!();
                for summary in &rooms {
                    Output::room_info(summary);
                }
            }
        }

        RoomAction::Delete { room_id } => {
            if orchestrator.delete_room(*room_id).await? {
                Output::success(&format!("Deleted room {}", room_id));
            } else {
                Output::warning(&format!("Room {} does not exist", room_id));
            }
        }
    }

    Ok(())
}
