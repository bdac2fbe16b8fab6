//! Communication channels.
//!
//! `Channel` is a bounded, closable FIFO queue shared by clone. Sends block
//! while the buffer is full (capacity 0 is a rendezvous), receives block
//! while it is empty. Closing drops the only long-lived sender: receivers
//! drain what is buffered and then observe the close.

use std::sync::{Arc, RwLock};

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::error::{Result, ValueError};
use crate::types::Type;
use crate::value::Value;

#[derive(Debug)]
struct ChannelInner {
    sender: RwLock<Option<Sender<Value>>>,
    receiver: Receiver<Value>,
    cap: usize,
}

#[derive(Debug, Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

impl Channel {
    pub fn bounded(cap: usize) -> Self {
        let (tx, rx) = bounded(cap);
        Self {
            inner: Arc::new(ChannelInner {
                sender: RwLock::new(Some(tx)),
                receiver: rx,
                cap,
            }),
        }
    }

    /// Blocking send. Fails once the channel is closed.
    pub fn send(&self, value: Value) -> Result<()> {
        // Clone the sender out of the lock so a blocked send never holds it.
        let sender = self
            .inner
            .sender
            .read()
            .expect("channel sender poisoned")
            .clone()
            .ok_or(ValueError::SendOnClosedChannel)?;
        sender
            .send(value)
            .map_err(|_| ValueError::SendOnClosedChannel)
    }

    /// Blocking receive. `None` once closed and drained.
    pub fn recv(&self) -> Option<Value> {
        self.inner.receiver.recv().ok()
    }

    /// Non-blocking receive. `None` when empty or closed.
    pub fn try_recv(&self) -> Option<Value> {
        self.inner.receiver.try_recv().ok()
    }

    pub fn close(&self) -> Result<()> {
        self.inner
            .sender
            .write()
            .expect("channel sender poisoned")
            .take()
            .map(drop)
            .ok_or(ValueError::CloseOfClosedChannel)
    }

    pub fn is_closed(&self) -> bool {
        self.inner
            .sender
            .read()
            .expect("channel sender poisoned")
            .is_none()
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        self.inner.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.receiver.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.inner.cap
    }

    /// Drain until closed.
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        std::iter::from_fn(move || self.recv())
    }

    pub fn same_channel(&self, other: &Channel) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

// ---------------------------------------------------------------------------
// Typed channel value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Chan {
    elem: Type,
    channel: Option<Channel>,
}

impl Chan {
    pub fn new(elem: Type, cap: usize) -> Self {
        Self::from_channel(elem, Channel::bounded(cap))
    }

    pub fn from_channel(elem: Type, channel: Channel) -> Self {
        Self {
            elem,
            channel: Some(channel),
        }
    }

    pub fn nil(elem: Type) -> Self {
        Self {
            elem,
            channel: None,
        }
    }

    pub fn elem(&self) -> &Type {
        &self.elem
    }

    pub fn channel(&self) -> Option<&Channel> {
        self.channel.as_ref()
    }

    pub fn is_nil(&self) -> bool {
        self.channel.is_none()
    }

    pub fn send(&self, value: Value) -> Result<()> {
        self.channel
            .as_ref()
            .ok_or(ValueError::SendOnNilChannel)?
            .send(value)
    }

    /// `None` for a nil channel, or once closed and drained.
    pub fn recv(&self) -> Option<Value> {
        self.channel.as_ref()?.recv()
    }

    pub fn close(&self) -> Result<()> {
        self.channel
            .as_ref()
            .ok_or(ValueError::CloseOfNilChannel)?
            .close()
    }

    pub fn len(&self) -> usize {
        self.channel.as_ref().map_or(0, Channel::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cap(&self) -> usize {
        self.channel.as_ref().map_or(0, Channel::cap)
    }

    pub fn same_channel(&self, other: &Chan) -> bool {
        match (&self.channel, &other.channel) {
            (Some(a), Some(b)) => a.same_channel(b),
            (None, None) => true,
            _ => false,
        }
    }
}
