//! Scanner output shared by the unit tests.

pub(crate) const PUSH_NOTIFICATIONS_ID: &str = "integreat_cms.cms.models.push_notifications";

pub(crate) const PUSH_NOTIFICATIONS: &str = r"integreat\_cms.cms.models.push\_notifications package
=====================================================

.. automodule:: integreat_cms.cms.models.push_notifications
   :members:
   :undoc-members:
   :inherited-members:
   :show-inheritance:

Submodules
----------

integreat\_cms.cms.models.push\_notifications.push\_notification module
-----------------------------------------------------------------------

.. automodule:: integreat_cms.cms.models.push_notifications.push_notification
   :members:
   :undoc-members:
   :inherited-members:
   :show-inheritance:
";
