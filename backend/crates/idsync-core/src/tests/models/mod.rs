mod local_user;
mod remote_user;
mod sync_direction;
mod sync_run;
mod webhook_event;
