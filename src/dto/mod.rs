pub mod campaign_dto;
