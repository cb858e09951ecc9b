use anyhow::anyhow;

/// Connectivity represents the "connected" state of a mocked driven port and provides
/// common behavior for returning an error if the port is configured to be in a disconnected state.
pub enum Connectivity {
    Connected,
    Disconnected,
}

impl Connectivity {
    /// Return an error if connectivity is in a "disconnected" state
    pub fn blow_up_if_disconnected(&self) -> Result<(), anyhow::Error> {
        match self {
            Self::Connected => Ok(()),
            Self::Disconnected => Err(anyhow!("could not connect to the task store!")),
        }
    }
}

/// FakeImplementation stands in for a single function on a mocked trait. It records the
/// arguments of every call and hands back a configured return value, which covers the
/// async trait functions that mocking libraries struggle with.
///
/// * [Args] is the captured argument tuple for one call
/// * [Ret] is the type of the function's return value
///
/// # Example
///
/// ```ignore
/// struct FakeTaskLookup {
///     lookup_result: FakeImplementation<i32, Option<String>>,
/// }
///
/// impl TaskLookup for Mutex<FakeTaskLookup> {
///     async fn lookup(&self, task_id: i32) -> Option<String> {
///         let mut locked_self = self.lock().unwrap();
///         locked_self.lookup_result.save_arguments(task_id);
///
///         locked_self.lookup_result.return_value()
///     }
/// }
/// ```
pub struct FakeImplementation<Args, Ret> {
    saved_arguments: Vec<Args>,
    return_value: Option<Ret>,
}

impl<Args, Ret> FakeImplementation<Args, Ret> {
    pub fn new() -> FakeImplementation<Args, Ret> {
        FakeImplementation {
            saved_arguments: Vec::new(),
            return_value: None,
        }
    }

    /// Saves arguments from a single invocation of the FakeImplementation
    pub fn save_arguments(&mut self, arguments: Args) {
        self.saved_arguments.push(arguments)
    }

    /// Returns the arguments passed on every call to this FakeImplementation, oldest first
    pub fn calls(&self) -> &[Args] {
        self.saved_arguments.as_slice()
    }
}

impl<Args, Ret> FakeImplementation<Args, Ret>
where
    Ret: Clone,
{
    pub fn set_return_value(&mut self, return_value: Ret) {
        self.return_value = Some(return_value)
    }

    pub fn return_value(&self) -> Ret {
        match self.return_value {
            None => panic!("Tried to return from a function where the return value wasn't set!"),
            Some(ref ret_val) => ret_val.clone(),
        }
    }
}

impl<Args, Success> FakeImplementation<Args, anyhow::Result<Success>>
where
    Success: Clone,
{
    /// Set the result that should be returned when this FakeImplementation is invoked.
    /// [anyhow::Error] does not implement [Clone], so errors are re-created from their message.
    pub fn set_returned_anyhow(&mut self, return_value: anyhow::Result<Success>) {
        match return_value {
            Ok(ok_result) => self.return_value = Some(Ok(ok_result)),
            Err(err) => self.return_value = Some(Err(anyhow!(format!("{}", err)))),
        }
    }

    pub fn return_value_anyhow(&self) -> anyhow::Result<Success> {
        match self.return_value {
            None => panic!("Tried to return from a function where the value wasn't set!"),
            Some(Ok(ref ok_result)) => Ok(ok_result.clone()),
            Some(Err(ref err)) => Err(anyhow!(format!("{}", err))),
        }
    }
}
