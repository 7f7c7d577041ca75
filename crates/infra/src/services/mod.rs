pub mod push;
pub mod task_queue;

use push::IPushSender;
use std::sync::Arc;
use task_queue::ITaskQueue;

#[derive(Clone)]
pub struct Services {
    pub push: Arc<dyn IPushSender>,
    pub task_queue: Arc<dyn ITaskQueue>,
}
