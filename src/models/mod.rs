pub mod address;
pub mod draft;
pub mod events;
pub mod poll;
pub mod rpc;
pub mod view;
pub mod websocket;
pub mod wide;
